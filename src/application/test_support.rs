//! Scripted port implementations shared by the application tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::{InMemorySessionStorage, SwitchableScopeProvider};
use crate::domain::foundation::{ClaimId, GuestId, ProjectId};
use crate::domain::guest::{
    ClaimResolution, GuestError, GuestSession, LinkDispatch, PendingClaim, PersonMatch,
    SessionKind, SessionScope, SessionToken, VerificationState,
};
use crate::ports::{
    ClaimAdminApi, DeviceFingerprinter, GuestApi, IdentificationRequest, IdentifiedGuest,
    RegisteredGuest, RegistrationRequest, SessionStatusReport, SessionValidation, UpdatedProfile,
    VerificationReport,
};

use super::SessionStore;

pub fn test_scope() -> SessionScope {
    SessionScope::new(ProjectId::new(7), SessionKind::Share)
}

pub fn registered(token: &str, name: &str, email: Option<&str>) -> RegisteredGuest {
    RegisteredGuest {
        id: GuestId::new(100),
        token: SessionToken::new(token),
        display_name: name.to_string(),
        email: email.map(str::to_string),
    }
}

/// Store over in-memory storage, plus the storage handle for assertions.
pub fn memory_store() -> (Arc<SessionStore>, InMemorySessionStorage) {
    let storage = InMemorySessionStorage::new();
    (Arc::new(SessionStore::new(Arc::new(storage.clone()))), storage)
}

/// Store already holding a session with `token` under [`test_scope`].
pub async fn store_with_session(token: &str) -> (Arc<SessionStore>, InMemorySessionStorage) {
    let (store, storage) = memory_store();
    let session = GuestSession::new(SessionToken::new(token), "Jane").with_id(GuestId::new(100));
    store
        .persist(test_scope(), session, VerificationState::default())
        .await
        .unwrap();
    (store, storage)
}

pub fn scopes() -> Arc<SwitchableScopeProvider> {
    Arc::new(SwitchableScopeProvider::with_scope(test_scope()))
}

pub struct FixedFingerprint;

impl DeviceFingerprinter for FixedFingerprint {
    fn fingerprint(&self) -> String {
        "abc123".to_string()
    }
}

type Scripted<T> = Mutex<VecDeque<(Duration, Result<T, GuestError>)>>;

/// Guest API returning scripted answers and recording every call.
///
/// Status checks pop from their queue; an exhausted queue repeats the
/// `*_default` answer. Each scripted answer may carry a delay.
pub struct MockGuestApi {
    calls: Mutex<Vec<String>>,
    pub register_result: Mutex<Result<RegisteredGuest, GuestError>>,
    pub identification_result: Mutex<Result<IdentifiedGuest, GuestError>>,
    pub validate_result: Mutex<Result<SessionValidation, GuestError>>,
    pub update_result: Mutex<Result<UpdatedProfile, GuestError>>,
    pub heartbeat_result: Mutex<Result<(), GuestError>>,
    pub link_result: Mutex<Result<LinkDispatch, GuestError>>,
    pub search_result: Mutex<Result<Vec<PersonMatch>, GuestError>>,
    pub pending_result: Mutex<Result<Vec<PendingClaim>, GuestError>>,
    pub resolve_result: Mutex<Result<ClaimResolution, GuestError>>,
    session_status: Scripted<SessionStatusReport>,
    pub session_status_default: Mutex<Result<SessionStatusReport, GuestError>>,
    verification_status: Scripted<VerificationReport>,
    pub verification_status_default: Mutex<Result<VerificationReport, GuestError>>,
}

impl Default for MockGuestApi {
    fn default() -> Self {
        let link = LinkDispatch {
            success: true,
            message: "Sent".to_string(),
        };
        Self {
            calls: Mutex::new(Vec::new()),
            register_result: Mutex::new(Ok(registered("tok-1", "Jane", None))),
            identification_result: Mutex::new(Err(GuestError::network("unscripted"))),
            validate_result: Mutex::new(Ok(SessionValidation {
                valid: true,
                guest_id: None,
            })),
            update_result: Mutex::new(Err(GuestError::network("unscripted"))),
            heartbeat_result: Mutex::new(Ok(())),
            link_result: Mutex::new(Ok(link)),
            search_result: Mutex::new(Ok(Vec::new())),
            pending_result: Mutex::new(Ok(Vec::new())),
            resolve_result: Mutex::new(Ok(ClaimResolution {
                claim_id: ClaimId::new(1),
                approved: true,
                message: "Approved".to_string(),
            })),
            session_status: Mutex::new(VecDeque::new()),
            session_status_default: Mutex::new(Ok(SessionStatusReport::valid())),
            verification_status: Mutex::new(VecDeque::new()),
            verification_status_default: Mutex::new(Ok(VerificationReport::from_status(
                crate::domain::guest::VerificationStatus::Pending,
            ))),
        }
    }
}

impl MockGuestApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn script_session_status(&self, delay: Duration, answer: Result<SessionStatusReport, GuestError>) {
        self.session_status.lock().unwrap().push_back((delay, answer));
    }

    pub fn script_verification_status(
        &self,
        delay: Duration,
        answer: Result<VerificationReport, GuestError>,
    ) {
        self.verification_status
            .lock()
            .unwrap()
            .push_back((delay, answer));
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    async fn scripted<T: Clone>(
        queue: &Scripted<T>,
        default: &Mutex<Result<T, GuestError>>,
    ) -> Result<T, GuestError> {
        let next = queue.lock().unwrap().pop_front();
        match next {
            Some((delay, answer)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                answer
            }
            None => default.lock().unwrap().clone(),
        }
    }
}

#[async_trait]
impl GuestApi for MockGuestApi {
    async fn register(&self, request: &RegistrationRequest) -> Result<RegisteredGuest, GuestError> {
        self.record("register");
        assert!(!request.device_identifier.is_empty());
        self.register_result.lock().unwrap().clone()
    }

    async fn register_with_identification(
        &self,
        _request: &IdentificationRequest,
    ) -> Result<IdentifiedGuest, GuestError> {
        self.record("register_with_identification");
        self.identification_result.lock().unwrap().clone()
    }

    async fn validate(&self, _token: &SessionToken) -> Result<SessionValidation, GuestError> {
        self.record("validate");
        self.validate_result.lock().unwrap().clone()
    }

    async fn update_profile(
        &self,
        _token: &SessionToken,
        _display_name: &str,
        _email: Option<&str>,
    ) -> Result<UpdatedProfile, GuestError> {
        self.record("update_profile");
        self.update_result.lock().unwrap().clone()
    }

    async fn heartbeat(&self, _token: &SessionToken) -> Result<(), GuestError> {
        self.record("heartbeat");
        self.heartbeat_result.lock().unwrap().clone()
    }

    async fn session_status(&self, _token: &SessionToken) -> Result<SessionStatusReport, GuestError> {
        self.record("session_status");
        Self::scripted(&self.session_status, &self.session_status_default).await
    }

    async fn verification_status(
        &self,
        _token: &SessionToken,
    ) -> Result<VerificationReport, GuestError> {
        self.record("verification_status");
        Self::scripted(&self.verification_status, &self.verification_status_default).await
    }

    async fn send_device_link(
        &self,
        _token: &SessionToken,
        _email: &str,
    ) -> Result<LinkDispatch, GuestError> {
        self.record("send_device_link");
        self.link_result.lock().unwrap().clone()
    }

    async fn request_restore_link(&self, _email: &str) -> Result<LinkDispatch, GuestError> {
        self.record("request_restore_link");
        self.link_result.lock().unwrap().clone()
    }

    async fn search_persons(&self, _query: &str, _limit: u32) -> Result<Vec<PersonMatch>, GuestError> {
        self.record("search_persons");
        self.search_result.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClaimAdminApi for MockGuestApi {
    async fn list_pending_claims(&self) -> Result<Vec<PendingClaim>, GuestError> {
        self.record("list_pending_claims");
        self.pending_result.lock().unwrap().clone()
    }

    async fn resolve_claim(
        &self,
        _claim_id: ClaimId,
        _approve: bool,
    ) -> Result<ClaimResolution, GuestError> {
        self.record("resolve_claim");
        self.resolve_result.lock().unwrap().clone()
    }
}
