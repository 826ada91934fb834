//! Verification check - watches the organizer's verdict on a pending claim.

use std::sync::Arc;

use async_trait::async_trait;

use super::poller::{PollDirective, StatusCheck};
use super::session_store::SessionStore;
use crate::domain::guest::{GuestError, InvalidationReason, SessionToken};
use crate::ports::{GuestApi, VerificationReport};

/// Polls the verification-status endpoint.
pub struct VerificationCheck {
    api: Arc<dyn GuestApi>,
    store: Arc<SessionStore>,
}

impl VerificationCheck {
    pub fn new(api: Arc<dyn GuestApi>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }
}

#[async_trait]
impl StatusCheck for VerificationCheck {
    type Report = (SessionToken, VerificationReport);

    async fn check(&self) -> Result<Self::Report, GuestError> {
        let session = self.store.current().ok_or(GuestError::NoSession)?;
        let report = self.api.verification_status(&session.token).await?;
        Ok((session.token, report))
    }

    async fn apply(&self, (token, report): Self::Report) -> PollDirective {
        if !self.store.apply_verification(&token, report.status).await {
            // Session cleared or replaced meanwhile.
            return PollDirective::Continue;
        }

        if report.is_banned {
            PollDirective::Invalidate {
                token,
                reason: InvalidationReason::Banned,
                message: None,
            }
        } else if report.is_rejected {
            PollDirective::Invalidate {
                token,
                reason: InvalidationReason::Rejected,
                message: None,
            }
        } else if report.is_verified {
            PollDirective::Finish
        } else {
            PollDirective::Continue
        }
    }
}
