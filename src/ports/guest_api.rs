//! Guest API port - the server endpoints the guest session core consumes.
//!
//! Implementations translate transport failures into [`GuestError`]:
//! - no response at all -> `GuestError::Network`
//! - HTTP 429 -> `GuestError::RateLimited`
//! - other non-2xx -> `GuestError::Server`
//! - 2xx with `success: false` -> `GuestError::Rejected`
//!
//! The two status checks are the exception: a 401/403 answer carries the
//! invalidation verdict and must be returned as a regular report.

use async_trait::async_trait;

use crate::domain::foundation::{GuestId, PersonId};
use crate::domain::guest::{
    GuestError, InvalidationReason, LinkDispatch, PersonMatch, SessionToken, VerificationState,
    VerificationStatus,
};

/// Payload of the simple registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub display_name: String,
    pub email: Option<String>,
    pub device_identifier: String,
}

/// Payload of the identification-assisted registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationRequest {
    pub nickname: String,
    pub person_id: Option<PersonId>,
    pub email: Option<String>,
    pub device_identifier: String,
}

/// Guest created by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredGuest {
    pub id: GuestId,
    pub token: SessionToken,
    pub display_name: String,
    pub email: Option<String>,
}

/// Guest created through identification, with its verification verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedGuest {
    pub guest: RegisteredGuest,
    pub verification: VerificationState,
}

/// Answer of the validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionValidation {
    pub valid: bool,
    pub guest_id: Option<GuestId>,
}

/// Profile as stored by the server after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedProfile {
    pub token: SessionToken,
    pub display_name: String,
    pub email: Option<String>,
}

/// Answer of the session-status endpoint (ban/deletion watch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatusReport {
    pub valid: bool,
    pub reason: Option<InvalidationReason>,
    pub message: Option<String>,
}

impl SessionStatusReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
            message: None,
        }
    }

    pub fn invalid(reason: InvalidationReason, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            message: Some(message.into()),
        }
    }
}

/// Answer of the verification-status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub status: VerificationStatus,
    pub is_pending: bool,
    pub is_verified: bool,
    pub is_rejected: bool,
    pub is_banned: bool,
}

impl VerificationReport {
    /// Report with flags derived from the status alone.
    pub fn from_status(status: VerificationStatus) -> Self {
        Self {
            status,
            is_pending: status == VerificationStatus::Pending,
            is_verified: status == VerificationStatus::Verified,
            is_rejected: status == VerificationStatus::Rejected,
            is_banned: false,
        }
    }

    pub fn banned(mut self) -> Self {
        self.is_banned = true;
        self
    }
}

/// Port for the guest-facing server endpoints.
#[async_trait]
pub trait GuestApi: Send + Sync {
    async fn register(&self, request: &RegistrationRequest)
        -> Result<RegisteredGuest, GuestError>;

    async fn register_with_identification(
        &self,
        request: &IdentificationRequest,
    ) -> Result<IdentifiedGuest, GuestError>;

    async fn validate(&self, token: &SessionToken) -> Result<SessionValidation, GuestError>;

    async fn update_profile(
        &self,
        token: &SessionToken,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<UpdatedProfile, GuestError>;

    async fn heartbeat(&self, token: &SessionToken) -> Result<(), GuestError>;

    async fn session_status(&self, token: &SessionToken)
        -> Result<SessionStatusReport, GuestError>;

    async fn verification_status(
        &self,
        token: &SessionToken,
    ) -> Result<VerificationReport, GuestError>;

    async fn send_device_link(
        &self,
        token: &SessionToken,
        email: &str,
    ) -> Result<LinkDispatch, GuestError>;

    async fn request_restore_link(&self, email: &str) -> Result<LinkDispatch, GuestError>;

    async fn search_persons(&self, query: &str, limit: u32)
        -> Result<Vec<PersonMatch>, GuestError>;
}
