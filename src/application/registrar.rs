//! IdentityRegistrar - creates and edits guest identities.
//!
//! Registration never leaves partial state behind: input is validated and
//! the active scope resolved before any request, and the store is only
//! written after the server accepted.

use std::sync::Arc;

use super::session_store::SessionStore;
use crate::domain::foundation::PersonId;
use crate::domain::guest::{
    normalize_optional_email, validate_name, GuestError, GuestSession, PersonMatch,
    VerificationState,
};
use crate::ports::{
    ActiveScopeProvider, DeviceFingerprinter, GuestApi, IdentificationRequest,
    RegistrationRequest,
};

/// Queries shorter than this never reach the server.
const MIN_ROSTER_QUERY_CHARS: usize = 2;
/// Page size of the roster search.
const ROSTER_SEARCH_LIMIT: u32 = 10;

/// Session created through identification, with its verification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedSession {
    pub session: GuestSession,
    pub verification: VerificationState,
}

/// Handler for guest registration and profile edits.
pub struct IdentityRegistrar {
    api: Arc<dyn GuestApi>,
    store: Arc<SessionStore>,
    scopes: Arc<dyn ActiveScopeProvider>,
    fingerprinter: Arc<dyn DeviceFingerprinter>,
}

impl IdentityRegistrar {
    pub fn new(
        api: Arc<dyn GuestApi>,
        store: Arc<SessionStore>,
        scopes: Arc<dyn ActiveScopeProvider>,
        fingerprinter: Arc<dyn DeviceFingerprinter>,
    ) -> Self {
        Self {
            api,
            store,
            scopes,
            fingerprinter,
        }
    }

    /// Registers a new guest under the active scope.
    pub async fn register(
        &self,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<GuestSession, GuestError> {
        // 1. Validate input and resolve where the result will live
        let display_name = validate_name("display_name", display_name)?;
        let email = normalize_optional_email(email)?;
        let scope = self.scopes.active_scope().ok_or(GuestError::NoActiveScope)?;

        // 2. Ask the server
        let request = RegistrationRequest {
            display_name,
            email,
            device_identifier: self.fingerprinter.fingerprint(),
        };
        let guest = self.api.register(&request).await?;

        // 3. Replace the scope's record
        let session = GuestSession::new(guest.token, guest.display_name)
            .with_id(guest.id)
            .with_email(guest.email);
        self.store
            .persist(scope, session.clone(), VerificationState::default())
            .await?;

        tracing::info!(
            project_id = %scope.project_id,
            kind = %scope.kind,
            guest_id = %guest.id,
            "guest registered"
        );
        Ok(session)
    }

    /// Registers a guest claiming a roster identity.
    ///
    /// A pending verdict is stored as-is; the verification poller settles it.
    pub async fn register_with_identification(
        &self,
        nickname: &str,
        person_id: Option<PersonId>,
        email: Option<&str>,
    ) -> Result<IdentifiedSession, GuestError> {
        // 1. Validate input and resolve where the result will live
        let nickname = validate_name("nickname", nickname)?;
        let email = normalize_optional_email(email)?;
        let scope = self.scopes.active_scope().ok_or(GuestError::NoActiveScope)?;

        // 2. Ask the server
        let request = IdentificationRequest {
            nickname,
            person_id,
            email,
            device_identifier: self.fingerprinter.fingerprint(),
        };
        let identified = self.api.register_with_identification(&request).await?;

        // 3. Replace the scope's record, verdict included
        let guest = identified.guest;
        let session = GuestSession::new(guest.token, guest.display_name)
            .with_id(guest.id)
            .with_email(guest.email);
        self.store
            .persist(scope, session.clone(), identified.verification.clone())
            .await?;

        tracing::info!(
            project_id = %scope.project_id,
            kind = %scope.kind,
            guest_id = %guest.id,
            status = %identified.verification.status,
            "guest registered with identification"
        );
        Ok(IdentifiedSession {
            session,
            verification: identified.verification,
        })
    }

    /// Changes the display name and email of the current guest.
    ///
    /// The guest id is kept; the token is whatever the server answers with.
    pub async fn update_profile(
        &self,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<GuestSession, GuestError> {
        let display_name = validate_name("display_name", display_name)?;
        let email = normalize_optional_email(email)?;
        let current = self.store.current().ok_or(GuestError::NoSession)?;
        let scope = self
            .store
            .bound_scope()
            .or_else(|| self.scopes.active_scope())
            .ok_or(GuestError::NoActiveScope)?;

        let profile = self
            .api
            .update_profile(&current.token, &display_name, email.as_deref())
            .await?;

        let session = GuestSession {
            id: current.id,
            token: profile.token,
            display_name: profile.display_name,
            email: profile.email,
        };
        self.store
            .persist(scope, session.clone(), self.store.verification())
            .await?;

        tracing::info!(project_id = %scope.project_id, kind = %scope.kind, "guest profile updated");
        Ok(session)
    }

    /// Roster autocomplete. Best effort: failures yield an empty list.
    pub async fn search_roster(&self, query: &str) -> Vec<PersonMatch> {
        let query = query.trim();
        if query.chars().count() < MIN_ROSTER_QUERY_CHARS {
            return Vec::new();
        }

        match self.api.search_persons(query, ROSTER_SEARCH_LIMIT).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!(error = %e, "roster search failed");
                Vec::new()
            }
        }
    }
}
