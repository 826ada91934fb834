//! Wire formats of the guest endpoints.
//!
//! Every JSON answer except validation and session status is wrapped in a
//! `{success, message?, data?}` envelope. Field names are snake_case on the
//! wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClaimId, GuestId, PersonId};
use crate::domain::guest::{
    GuestError, InvalidationReason, PendingClaim, SessionToken, VerificationState,
    VerificationStatus, GENERIC_FAILURE_MESSAGE,
};
use crate::ports::{
    IdentifiedGuest, RegisteredGuest, SessionStatusReport, UpdatedProfile, VerificationReport,
};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub(super) struct RegisterBody<'a> {
    pub guest_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<&'a str>,
    pub device_identifier: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct IdentificationBody<'a> {
    pub nickname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub device_identifier: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct TokenBody<'a> {
    pub session_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateBody<'a> {
    pub session_token: &'a str,
    pub guest_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeviceLinkBody<'a> {
    pub session_token: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailBody<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ResolveBody {
    pub approve: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// `{success, message?, data?}` wrapper.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Data of a successful envelope; `success: false` or a missing payload
    /// becomes `Rejected` with the server message or `fallback`.
    pub fn into_data(self, fallback: &str) -> Result<T, GuestError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(GuestError::rejected(self.message, fallback)),
        }
    }
}

/// Error body of a non-2xx answer. Only the message is of interest.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GuestData {
    pub id: GuestId,
    pub session_token: String,
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
}

impl From<GuestData> for RegisteredGuest {
    fn from(data: GuestData) -> Self {
        RegisteredGuest {
            id: data.id,
            token: SessionToken::new(data.session_token),
            display_name: data.guest_name,
            email: data.guest_email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct IdentifiedData {
    #[serde(flatten)]
    pub guest: GuestData,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default, alias = "person_id")]
    pub missing_person_id: Option<PersonId>,
    #[serde(default, alias = "person_name")]
    pub missing_person_name: Option<String>,
}

impl From<IdentifiedData> for IdentifiedGuest {
    fn from(data: IdentifiedData) -> Self {
        IdentifiedGuest {
            verification: VerificationState::new(
                data.verification_status,
                data.missing_person_id,
                data.missing_person_name,
            ),
            guest: data.guest.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidateAnswer {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub data: Option<ValidatedGuest>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidatedGuest {
    #[serde(default)]
    pub id: Option<GuestId>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProfileData {
    pub session_token: String,
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
}

impl From<ProfileData> for UpdatedProfile {
    fn from(data: ProfileData) -> Self {
        UpdatedProfile {
            token: SessionToken::new(data.session_token),
            display_name: data.guest_name,
            email: data.guest_email,
        }
    }
}

/// Session-status answer. `valid` is required; unknown reasons are kept
/// as `None`.
#[derive(Debug, Deserialize)]
pub(super) struct SessionStatusAnswer {
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<SessionStatusAnswer> for SessionStatusReport {
    fn from(answer: SessionStatusAnswer) -> Self {
        let reason = answer.reason.as_deref().and_then(|r| match r {
            "banned" => Some(InvalidationReason::Banned),
            "deleted" => Some(InvalidationReason::Deleted),
            "rejected" => Some(InvalidationReason::Rejected),
            _ => None,
        });
        SessionStatusReport {
            valid: answer.valid,
            reason,
            message: answer.message.filter(|m| !m.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct VerificationData {
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub is_pending: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_rejected: bool,
    #[serde(default)]
    pub is_banned: bool,
}

impl From<VerificationData> for VerificationReport {
    fn from(data: VerificationData) -> Self {
        VerificationReport {
            status: data.verification_status,
            is_pending: data.is_pending,
            is_verified: data.is_verified,
            is_rejected: data.is_rejected,
            is_banned: data.is_banned,
        }
    }
}

/// Answer of the mail-a-link endpoints and of claim resolution.
#[derive(Debug, Deserialize)]
pub(super) struct MessageAnswer {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageAnswer {
    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }
}

/// One pending claim as listed by the admin endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct PendingClaimData {
    pub id: ClaimId,
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default, alias = "missing_person_id")]
    pub person_id: Option<PersonId>,
    #[serde(default, alias = "missing_person_name")]
    pub person_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<PendingClaimData> for PendingClaim {
    fn from(data: PendingClaimData) -> Self {
        PendingClaim {
            claim_id: data.id,
            guest_name: data.guest_name,
            guest_email: data.guest_email,
            person_id: data.person_id,
            person_name: data.person_name,
            requested_at: data.created_at,
        }
    }
}

/// The listing endpoint answers either a bare array or `{sessions: [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum PendingClaimList {
    Bare(Vec<PendingClaimData>),
    Wrapped { sessions: Vec<PendingClaimData> },
}

impl PendingClaimList {
    pub fn into_claims(self) -> Vec<PendingClaim> {
        let items = match self {
            PendingClaimList::Bare(items) => items,
            PendingClaimList::Wrapped { sessions } => sessions,
        };
        items.into_iter().map(PendingClaim::from).collect()
    }
}
