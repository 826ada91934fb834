//! Guest session and its durable projection.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::verification::{VerificationState, VerificationStatus};
use crate::domain::foundation::GuestId;

/// Opaque credential identifying the guest to the server.
///
/// The only authorization sent with follow-up calls. `Debug` is redacted so
/// tokens never end up in logs.
pub struct SessionToken(Secret<String>);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    /// Exposes the raw token for request construction.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SessionToken {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Identity of an anonymous participant for one project scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestSession {
    /// Server-assigned; absent for sessions restored from a login exchange.
    pub id: Option<GuestId>,
    pub token: SessionToken,
    pub display_name: String,
    pub email: Option<String>,
}

impl GuestSession {
    pub fn new(token: SessionToken, display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            token,
            display_name: display_name.into(),
            email: None,
        }
    }

    pub fn with_id(mut self, id: GuestId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Rebuilds an in-memory session from a stored record.
    ///
    /// Email is not persisted, so a hydrated session never carries one.
    pub fn from_record(record: &StoredSessionRecord) -> Self {
        Self {
            id: record.guest_id,
            token: SessionToken::new(record.token.clone()),
            display_name: record.display_name.clone(),
            email: None,
        }
    }
}

/// Durable projection of a session and its verification status.
///
/// Serialized as `{token, displayName, guestId?, verificationStatus?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSessionRecord {
    pub token: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
}

impl StoredSessionRecord {
    pub fn from_session(session: &GuestSession, verification: &VerificationState) -> Self {
        Self {
            token: session.token.expose().to_string(),
            display_name: session.display_name.clone(),
            guest_id: session.id,
            verification_status: Some(verification.status),
        }
    }

    /// A record is only usable when both token and name are present.
    pub fn is_usable(&self) -> bool {
        !self.token.trim().is_empty() && !self.display_name.trim().is_empty()
    }
}
