//! SessionStore - owner of the current guest identity.
//!
//! Holds the session and its verification state in memory, mirrors them to a
//! [`SessionStorage`] keyed by scope, and broadcasts every change.
//!
//! Mutations are serialized by an async lock held across the storage I/O;
//! the in-memory value is swapped in one assignment once storage agrees, so
//! readers never observe an intermediate state.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{broadcast, Mutex};

use crate::domain::foundation::GuestId;
use crate::domain::guest::{
    GuestError, GuestSession, SessionScope, SessionToken, StoredSessionRecord, VerificationState,
    VerificationStatus,
};
use crate::ports::SessionStorage;

/// Buffered changes per subscriber before it starts lagging.
const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Snapshot of the identity as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuestState {
    pub session: Option<GuestSession>,
    pub verification: VerificationState,
}

#[derive(Debug, Default)]
struct Inner {
    /// Scope the current session was loaded or persisted under.
    scope: Option<SessionScope>,
    state: GuestState,
}

/// In-memory owner of the guest session, write-through to storage.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    inner: RwLock<Inner>,
    changes: broadcast::Sender<GuestState>,
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            storage,
            inner: RwLock::new(Inner::default()),
            changes,
            write_lock: Mutex::new(()),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Reads
    // ════════════════════════════════════════════════════════════════════════════

    /// The current session, if any.
    pub fn current(&self) -> Option<GuestSession> {
        self.read(|inner| inner.state.session.clone())
    }

    /// Last known verification state.
    ///
    /// Survives `clear` so the verdict that ended a session stays readable.
    pub fn verification(&self) -> VerificationState {
        self.read(|inner| inner.state.verification.clone())
    }

    pub fn snapshot(&self) -> GuestState {
        self.read(|inner| inner.state.clone())
    }

    pub fn has_session(&self) -> bool {
        self.read(|inner| inner.state.session.is_some())
    }

    /// Scope the current session belongs to.
    pub fn bound_scope(&self) -> Option<SessionScope> {
        self.read(|inner| inner.scope)
    }

    /// Receives every change after the call. Use [`snapshot`](Self::snapshot)
    /// for the current value.
    pub fn subscribe(&self) -> broadcast::Receiver<GuestState> {
        self.changes.subscribe()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Mutations
    // ════════════════════════════════════════════════════════════════════════════

    /// Loads the stored record for `scope` into memory.
    ///
    /// No-op when the scope is already loaded or no usable record exists.
    /// Returns whether a session was loaded.
    pub async fn hydrate(&self, scope: SessionScope) -> Result<bool, GuestError> {
        let _guard = self.write_lock.lock().await;

        if self.read(|inner| inner.scope == Some(scope) && inner.state.session.is_some()) {
            return Ok(false);
        }

        let record = match self.storage.load(&scope).await? {
            Some(record) if record.is_usable() => record,
            Some(_) => {
                tracing::warn!(scope = %scope, "ignoring incomplete stored guest session");
                return Ok(false);
            }
            None => return Ok(false),
        };

        let state = GuestState {
            session: Some(GuestSession::from_record(&record)),
            verification: VerificationState::with_status(
                record.verification_status.unwrap_or_default(),
            ),
        };
        self.replace(Some(scope), state);
        tracing::debug!(scope = %scope, "hydrated guest session from storage");
        Ok(true)
    }

    /// Replaces the record for `scope` and the in-memory identity.
    ///
    /// Storage is written first; on failure memory is left untouched.
    pub async fn persist(
        &self,
        scope: SessionScope,
        session: GuestSession,
        verification: VerificationState,
    ) -> Result<(), GuestError> {
        let _guard = self.write_lock.lock().await;

        let record = StoredSessionRecord::from_session(&session, &verification);
        self.storage.save(&scope, &record).await?;

        self.replace(
            Some(scope),
            GuestState {
                session: Some(session),
                verification,
            },
        );
        Ok(())
    }

    /// Deletes the record for `scope` and drops the in-memory session.
    ///
    /// Memory is cleared even when storage fails; the storage error is still
    /// returned.
    pub async fn clear(&self, scope: SessionScope) -> Result<(), GuestError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.storage.remove(&scope).await;
        self.drop_session();
        removed.map_err(GuestError::from)
    }

    /// Clears the session and its record if `token` is still the current one.
    ///
    /// Returns whether anything was cleared.
    pub async fn clear_if_current(&self, token: &SessionToken) -> Result<bool, GuestError> {
        self.clear_if_current_with(token, || {}).await
    }

    /// Like [`clear_if_current`](Self::clear_if_current), running
    /// `before_clear` once the token is confirmed current and before anything
    /// is removed. No registration can slip in between the two.
    pub async fn clear_if_current_with<F>(
        &self,
        token: &SessionToken,
        before_clear: F,
    ) -> Result<bool, GuestError>
    where
        F: FnOnce(),
    {
        let _guard = self.write_lock.lock().await;
        if !self.is_current(token) {
            return Ok(false);
        }
        before_clear();
        self.clear_locked().await.map(|()| true)
    }

    /// Applies a server-reported verification status to the session that
    /// `token` identifies. A cleared or replaced session is never touched.
    ///
    /// A failed storage write is logged; memory is updated regardless.
    pub async fn apply_verification(
        &self,
        token: &SessionToken,
        status: VerificationStatus,
    ) -> bool {
        self.update_if_current(token, |state| {
            state.verification = state.verification.with_reported_status(status);
        })
        .await
    }

    /// Records the server-assigned guest id on the session `token` identifies.
    pub async fn record_guest_id(&self, token: &SessionToken, id: GuestId) -> bool {
        self.update_if_current(token, |state| {
            if let Some(session) = state.session.as_mut() {
                session.id = Some(id);
            }
        })
        .await
    }

    /// Drops the in-memory session without touching storage.
    pub fn forget(&self) {
        self.drop_session();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════════

    async fn update_if_current<F>(&self, token: &SessionToken, mutate: F) -> bool
    where
        F: FnOnce(&mut GuestState),
    {
        let _guard = self.write_lock.lock().await;
        if !self.is_current(token) {
            return false;
        }

        let (scope, mut state) = self.read(|inner| (inner.scope, inner.state.clone()));
        mutate(&mut state);

        if let (Some(scope), Some(session)) = (scope, state.session.as_ref()) {
            let record = StoredSessionRecord::from_session(session, &state.verification);
            if let Err(e) = self.storage.save(&scope, &record).await {
                tracing::warn!(scope = %scope, error = %e, "failed to persist guest session update");
            }
        }

        self.replace(scope, state);
        true
    }

    async fn clear_locked(&self) -> Result<(), GuestError> {
        let removed = match self.bound_scope() {
            Some(scope) => self.storage.remove(&scope).await,
            None => Ok(()),
        };
        self.drop_session();
        removed.map_err(GuestError::from)
    }

    fn is_current(&self, token: &SessionToken) -> bool {
        self.read(|inner| {
            inner
                .state
                .session
                .as_ref()
                .is_some_and(|session| &session.token == token)
        })
    }

    fn drop_session(&self) {
        let verification = self.verification();
        self.replace(
            None,
            GuestState {
                session: None,
                verification,
            },
        );
    }

    fn replace(&self, scope: Option<SessionScope>, state: GuestState) {
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.scope = scope;
            inner.state = state.clone();
        }
        // No subscribers is fine.
        let _ = self.changes.send(state);
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner)
    }
}
