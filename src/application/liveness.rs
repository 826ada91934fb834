//! Session liveness check - watches for ban or deletion of the guest.

use std::sync::Arc;

use async_trait::async_trait;

use super::poller::{PollDirective, StatusCheck};
use super::session_store::SessionStore;
use crate::domain::guest::{GuestError, InvalidationReason, SessionToken};
use crate::ports::{GuestApi, SessionStatusReport};

/// Polls the session-status endpoint.
pub struct LivenessCheck {
    api: Arc<dyn GuestApi>,
    store: Arc<SessionStore>,
}

impl LivenessCheck {
    pub fn new(api: Arc<dyn GuestApi>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }
}

#[async_trait]
impl StatusCheck for LivenessCheck {
    type Report = (SessionToken, SessionStatusReport);

    async fn check(&self) -> Result<Self::Report, GuestError> {
        let session = self.store.current().ok_or(GuestError::NoSession)?;
        let report = self.api.session_status(&session.token).await?;
        Ok((session.token, report))
    }

    async fn apply(&self, (token, report): Self::Report) -> PollDirective {
        if report.valid {
            return PollDirective::Continue;
        }
        // A verdict about a session that has since been replaced says nothing
        // about the current one.
        let still_current = self
            .store
            .current()
            .is_some_and(|session| session.token == token);
        if !still_current {
            return PollDirective::Continue;
        }
        let Some(reason) = report.reason else {
            tracing::warn!("session reported invalid without a known reason; will retry");
            return PollDirective::Continue;
        };
        PollDirective::Invalidate {
            token,
            reason,
            message: report.message,
        }
    }
}
