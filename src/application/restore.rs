//! RestoreBroker - cross-device session recovery.
//!
//! Restored sessions skip fingerprinting; the mailed link is the trust anchor.

use std::sync::Arc;

use super::session_store::SessionStore;
use crate::domain::guest::{
    validate_email, validate_name, GuestError, GuestSession, LinkDispatch, RestoredSession,
    SessionScope, SessionToken, VerificationState,
};
use crate::ports::{ActiveScopeProvider, GuestApi};

/// Handler for restore links and sessions handed over by a login exchange.
pub struct RestoreBroker {
    api: Arc<dyn GuestApi>,
    store: Arc<SessionStore>,
    scopes: Arc<dyn ActiveScopeProvider>,
}

impl RestoreBroker {
    pub fn new(
        api: Arc<dyn GuestApi>,
        store: Arc<SessionStore>,
        scopes: Arc<dyn ActiveScopeProvider>,
    ) -> Self {
        Self { api, store, scopes }
    }

    /// Mails a restore link. Does not touch the current session.
    pub async fn request_restore_link(&self, email: &str) -> Result<LinkDispatch, GuestError> {
        let email = validate_email(email)?;
        let dispatch = self.api.request_restore_link(&email).await?;
        tracing::info!(success = dispatch.success, "restore link requested");
        Ok(dispatch)
    }

    /// Stores a session recovered through a restore link under the active scope.
    pub async fn accept_restored_session(
        &self,
        restored: RestoredSession,
    ) -> Result<GuestSession, GuestError> {
        let scope = self.scopes.active_scope().ok_or(GuestError::NoActiveScope)?;
        validate_name("display_name", &restored.display_name)?;
        self.store_for(scope, restored.into_session()).await
    }

    /// Mails a link that opens the current session on another device.
    pub async fn send_device_link(&self, email: &str) -> Result<LinkDispatch, GuestError> {
        let email = validate_email(email)?;
        let session = self.store.current().ok_or(GuestError::NoSession)?;
        self.api.send_device_link(&session.token, &email).await
    }

    /// Stores a session issued by a login exchange for an explicit scope.
    pub async fn adopt_login_session(
        &self,
        scope: SessionScope,
        token: SessionToken,
        display_name: &str,
    ) -> Result<GuestSession, GuestError> {
        let display_name = validate_name("display_name", display_name)?;
        self.store_for(scope, GuestSession::new(token, display_name))
            .await
    }

    async fn store_for(
        &self,
        scope: SessionScope,
        session: GuestSession,
    ) -> Result<GuestSession, GuestError> {
        self.store
            .persist(scope, session.clone(), VerificationState::default())
            .await?;
        tracing::info!(project_id = %scope.project_id, kind = %scope.kind, "guest session restored");
        Ok(session)
    }
}
