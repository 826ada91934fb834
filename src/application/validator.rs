//! SessionValidator - re-checks a stored session and sends heartbeats.

use std::sync::Arc;

use super::session_store::SessionStore;
use crate::domain::guest::SessionToken;
use crate::ports::GuestApi;

/// Handler for session validation and liveness heartbeats.
pub struct SessionValidator {
    api: Arc<dyn GuestApi>,
    store: Arc<SessionStore>,
}

impl SessionValidator {
    pub fn new(api: Arc<dyn GuestApi>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }

    /// Asks the server whether the current session is still valid.
    ///
    /// Without a session this returns `false` without a request. A `false`
    /// answer and any failure both clear the session; a failed validation is
    /// never ignored. A server-reported guest id is recorded.
    pub async fn validate_stored_session(&self) -> bool {
        let Some(session) = self.store.current() else {
            return false;
        };

        let outcome = self.api.validate(&session.token).await;
        match outcome {
            Ok(validation) if validation.valid => {
                if let Some(id) = validation.guest_id {
                    self.store.record_guest_id(&session.token, id).await;
                }
                true
            }
            Ok(_) => {
                tracing::info!("stored guest session rejected by server");
                self.discard(&session.token).await;
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "guest session validation failed");
                self.discard(&session.token).await;
                false
            }
        }
    }

    /// Best-effort liveness signal. Never fails, never touches local state.
    pub async fn send_heartbeat(&self) {
        let Some(session) = self.store.current() else {
            return;
        };
        if let Err(e) = self.api.heartbeat(&session.token).await {
            tracing::debug!(error = %e, "guest heartbeat failed");
        }
    }

    async fn discard(&self, token: &SessionToken) {
        if let Err(e) = self.store.clear_if_current(token).await {
            tracing::warn!(error = %e, "failed to remove stored guest session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{memory_store, store_with_session, MockGuestApi};
    use crate::domain::foundation::GuestId;
    use crate::domain::guest::GuestError;
    use crate::ports::SessionValidation;

    #[tokio::test]
    async fn no_session_returns_false_without_request() {
        let api = Arc::new(MockGuestApi::new());
        let (store, _) = memory_store();

        assert!(!SessionValidator::new(api.clone(), store).validate_stored_session().await);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn valid_session_is_kept_and_id_recorded() {
        let api = Arc::new(MockGuestApi::new());
        *api.validate_result.lock().unwrap() = Ok(SessionValidation {
            valid: true,
            guest_id: Some(GuestId::new(555)),
        });
        let (store, _) = store_with_session("tok").await;

        assert!(SessionValidator::new(api, store.clone()).validate_stored_session().await);
        assert_eq!(store.current().unwrap().id, Some(GuestId::new(555)));
    }

    #[tokio::test]
    async fn invalid_session_is_cleared() {
        let api = Arc::new(MockGuestApi::new());
        *api.validate_result.lock().unwrap() = Ok(SessionValidation {
            valid: false,
            guest_id: None,
        });
        let (store, storage) = store_with_session("tok").await;

        assert!(!SessionValidator::new(api, store.clone()).validate_stored_session().await);
        assert!(!store.has_session());
        assert_eq!(storage.record_count().await, 0);
    }

    #[tokio::test]
    async fn transport_failure_clears_like_invalid() {
        let api = Arc::new(MockGuestApi::new());
        *api.validate_result.lock().unwrap() = Err(GuestError::network("offline"));
        let (store, _) = store_with_session("tok").await;

        assert!(!SessionValidator::new(api, store.clone()).validate_stored_session().await);
        assert!(!store.has_session());
    }

    #[tokio::test]
    async fn heartbeat_failure_is_swallowed() {
        let api = Arc::new(MockGuestApi::new());
        *api.heartbeat_result.lock().unwrap() = Err(GuestError::server(503, "down"));
        let (store, _) = store_with_session("tok").await;
        let before = store.snapshot();

        SessionValidator::new(api.clone(), store.clone()).send_heartbeat().await;

        assert_eq!(api.call_count("heartbeat"), 1);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn heartbeat_without_session_sends_nothing() {
        let api = Arc::new(MockGuestApi::new());
        let (store, _) = memory_store();

        SessionValidator::new(api.clone(), store).send_heartbeat().await;

        assert!(api.calls().is_empty());
    }
}
