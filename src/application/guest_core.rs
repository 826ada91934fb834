//! GuestSessionCore - the surface collaborators use.
//!
//! Wires the store, the handlers, both pollers and the invalidation
//! sequence. Dropping the core stops both pollers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use super::claims::ConflictResolutionGateway;
use super::invalidation::{InvalidationBus, SessionInvalidator};
use super::liveness::LivenessCheck;
use super::poller::{PollerSwitch, StatusPoller};
use super::registrar::{IdentifiedSession, IdentityRegistrar};
use super::restore::RestoreBroker;
use super::session_store::{GuestState, SessionStore};
use super::validator::SessionValidator;
use super::verification::VerificationCheck;
use crate::domain::foundation::{ClaimId, PersonId};
use crate::domain::guest::{
    ClaimResolution, GuestError, GuestSession, InvalidationEvent, LinkDispatch, PendingClaim,
    PersonMatch, RestoredSession, SessionScope, SessionToken, VerificationState,
};
use crate::ports::{
    ActiveScopeProvider, ClaimAdminApi, DeviceFingerprinter, GuestApi, SessionStorage,
};

/// Header collaborators attach to their own guest-authenticated requests.
pub const GUEST_SESSION_HEADER: &str = "X-Guest-Session";

/// Intervals of the two pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingIntervals {
    pub liveness: Duration,
    pub verification: Duration,
}

impl Default for PollingIntervals {
    fn default() -> Self {
        Self {
            liveness: Duration::from_secs(30),
            verification: Duration::from_secs(5),
        }
    }
}

/// External collaborators the core is built from.
pub struct GuestCoreDeps {
    pub api: Arc<dyn GuestApi>,
    pub admin: Arc<dyn ClaimAdminApi>,
    pub storage: Arc<dyn SessionStorage>,
    pub scopes: Arc<dyn ActiveScopeProvider>,
    pub fingerprinter: Arc<dyn DeviceFingerprinter>,
}

/// Guest identity and verification session core.
pub struct GuestSessionCore {
    store: Arc<SessionStore>,
    scopes: Arc<dyn ActiveScopeProvider>,
    registrar: IdentityRegistrar,
    validator: SessionValidator,
    restore: RestoreBroker,
    claims: ConflictResolutionGateway,
    bus: InvalidationBus,
    liveness: StatusPoller<LivenessCheck>,
    verification: StatusPoller<VerificationCheck>,
}

impl GuestSessionCore {
    /// Builds the core. Pollers start only when asked to.
    pub fn new(deps: GuestCoreDeps, intervals: PollingIntervals) -> Self {
        let store = Arc::new(SessionStore::new(deps.storage));
        let bus = InvalidationBus::new();

        let liveness_switch = PollerSwitch::new();
        let verification_switch = PollerSwitch::new();
        let invalidator = Arc::new(SessionInvalidator::new(
            store.clone(),
            bus.clone(),
            vec![liveness_switch.clone(), verification_switch.clone()],
        ));

        let liveness = StatusPoller::new(
            "liveness",
            LivenessCheck::new(deps.api.clone(), store.clone()),
            intervals.liveness,
            liveness_switch,
            store.clone(),
            invalidator.clone(),
        );
        let verification = StatusPoller::new(
            "verification",
            VerificationCheck::new(deps.api.clone(), store.clone()),
            intervals.verification,
            verification_switch,
            store.clone(),
            invalidator,
        );

        Self {
            registrar: IdentityRegistrar::new(
                deps.api.clone(),
                store.clone(),
                deps.scopes.clone(),
                deps.fingerprinter,
            ),
            validator: SessionValidator::new(deps.api.clone(), store.clone()),
            restore: RestoreBroker::new(deps.api, store.clone(), deps.scopes.clone()),
            claims: ConflictResolutionGateway::new(deps.admin),
            scopes: deps.scopes,
            store,
            bus,
            liveness,
            verification,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // State
    // ════════════════════════════════════════════════════════════════════════════

    pub fn current(&self) -> Option<GuestSession> {
        self.store.current()
    }

    /// Every change after the call; pair with [`state`](Self::state).
    pub fn subscribe(&self) -> broadcast::Receiver<GuestState> {
        self.store.subscribe()
    }

    pub fn state(&self) -> GuestState {
        self.store.snapshot()
    }

    pub fn has_session(&self) -> bool {
        self.store.has_session()
    }

    /// True while the current session awaits an organizer verdict.
    pub fn is_pending(&self) -> bool {
        let state = self.store.snapshot();
        state.session.is_some() && state.verification.is_pending()
    }

    pub fn verification(&self) -> VerificationState {
        self.store.verification()
    }

    pub fn has_person_identification(&self) -> bool {
        self.store.verification().has_person_identification()
    }

    /// Stream of terminal invalidation events.
    pub fn invalidations(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.bus.subscribe()
    }

    /// `(header, token)` for the current session, hydrating from storage
    /// first when memory is empty.
    pub async fn session_header(&self) -> Option<(&'static str, String)> {
        if !self.store.has_session() {
            if let Err(e) = self.hydrate().await {
                tracing::debug!(error = %e, "no stored guest session for header");
            }
        }
        self.store
            .current()
            .map(|session| (GUEST_SESSION_HEADER, session.token.expose().to_string()))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Commands
    // ════════════════════════════════════════════════════════════════════════════

    /// Loads the stored session of the active scope.
    pub async fn hydrate(&self) -> Result<bool, GuestError> {
        let scope = self.scopes.active_scope().ok_or(GuestError::NoActiveScope)?;
        self.store.hydrate(scope).await
    }

    pub async fn register(
        &self,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<GuestSession, GuestError> {
        self.registrar.register(display_name, email).await
    }

    pub async fn register_with_identification(
        &self,
        nickname: &str,
        person_id: Option<PersonId>,
        email: Option<&str>,
    ) -> Result<IdentifiedSession, GuestError> {
        self.registrar
            .register_with_identification(nickname, person_id, email)
            .await
    }

    pub async fn update_profile(
        &self,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<GuestSession, GuestError> {
        self.registrar.update_profile(display_name, email).await
    }

    pub async fn search_roster(&self, query: &str) -> Vec<PersonMatch> {
        self.registrar.search_roster(query).await
    }

    pub async fn validate_stored_session(&self) -> bool {
        self.validator.validate_stored_session().await
    }

    pub async fn send_heartbeat(&self) {
        self.validator.send_heartbeat().await
    }

    /// Stops both pollers, then removes the session and its record.
    pub async fn clear(&self) -> Result<(), GuestError> {
        self.stop_all_polling();
        match self.store.bound_scope().or_else(|| self.scopes.active_scope()) {
            Some(scope) => self.store.clear(scope).await,
            None => {
                self.store.forget();
                Ok(())
            }
        }
    }

    pub fn start_liveness_polling(&self) -> bool {
        self.liveness.start()
    }

    pub fn stop_liveness_polling(&self) -> bool {
        self.liveness.stop()
    }

    pub fn is_liveness_polling(&self) -> bool {
        self.liveness.is_running()
    }

    pub fn start_verification_polling(&self) -> bool {
        self.verification.start()
    }

    pub fn stop_verification_polling(&self) -> bool {
        self.verification.stop()
    }

    pub fn is_verification_polling(&self) -> bool {
        self.verification.is_running()
    }

    pub async fn request_restore_link(&self, email: &str) -> Result<LinkDispatch, GuestError> {
        self.restore.request_restore_link(email).await
    }

    pub async fn accept_restored_session(
        &self,
        restored: RestoredSession,
    ) -> Result<GuestSession, GuestError> {
        self.restore.accept_restored_session(restored).await
    }

    pub async fn send_device_link(&self, email: &str) -> Result<LinkDispatch, GuestError> {
        self.restore.send_device_link(email).await
    }

    pub async fn adopt_login_session(
        &self,
        scope: SessionScope,
        token: SessionToken,
        display_name: &str,
    ) -> Result<GuestSession, GuestError> {
        self.restore
            .adopt_login_session(scope, token, display_name)
            .await
    }

    pub async fn list_pending_claims(&self) -> Result<Vec<PendingClaim>, GuestError> {
        self.claims.list_pending_claims().await
    }

    pub async fn resolve_claim(
        &self,
        claim_id: ClaimId,
        approve: bool,
    ) -> Result<ClaimResolution, GuestError> {
        self.claims.resolve_claim(claim_id, approve).await
    }

    fn stop_all_polling(&self) {
        self.liveness.stop();
        self.verification.stop();
    }
}

impl Drop for GuestSessionCore {
    fn drop(&mut self) {
        self.stop_all_polling();
    }
}
