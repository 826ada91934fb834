//! Guest session error taxonomy.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Fallback shown when the server gave no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
/// Shown for transport-level failures (no response at all).
pub const OFFLINE_MESSAGE: &str = "No internet connection.";
/// Shown when the server throttles us without a message.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please wait a moment.";

/// Errors surfaced by the guest session core.
///
/// `Display` is the human-readable message intended for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuestError {
    /// Malformed input caught before any network call.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No response from the server at all.
    #[error("{message}")]
    Network { message: String },

    /// Server throttling (HTTP 429).
    #[error("{message}")]
    RateLimited { message: String },

    /// Any other non-2xx answer.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx answer carrying `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The response body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Protocol(String),

    /// No (project, session kind) scope is active on this host.
    #[error("No active project session")]
    NoActiveScope,

    /// The operation needs a guest session and none is present.
    #[error("No active guest session")]
    NoSession,

    /// The storage adapter failed.
    #[error("Session storage failed: {0}")]
    Storage(String),
}

impl GuestError {
    pub fn network(message: impl Into<String>) -> Self {
        GuestError::Network {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        GuestError::RateLimited {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        GuestError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn rejected(message: Option<String>, fallback: &str) -> Self {
        GuestError::Rejected(
            message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GuestError::Validation(_) => ErrorCode::ValidationFailed,
            GuestError::Network { .. } => ErrorCode::NetworkUnavailable,
            GuestError::RateLimited { .. } => ErrorCode::RateLimited,
            GuestError::Server { .. } => ErrorCode::ServerError,
            GuestError::Rejected(_) => ErrorCode::RegistrationRejected,
            GuestError::Protocol(_) => ErrorCode::MalformedResponse,
            GuestError::NoActiveScope => ErrorCode::NoActiveScope,
            GuestError::NoSession => ErrorCode::NoSession,
            GuestError::Storage(_) => ErrorCode::StorageError,
        }
    }

    /// True for failures that say nothing about the session itself.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GuestError::Network { .. }
                | GuestError::RateLimited { .. }
                | GuestError::Server { .. }
                | GuestError::Protocol(_)
        )
    }
}
