//! Cross-device session recovery values.

use super::session::{GuestSession, SessionToken};

/// Session handed back by the out-of-band restore-link login exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredSession {
    pub token: SessionToken,
    pub display_name: String,
    pub email: Option<String>,
}

impl RestoredSession {
    pub fn new(
        token: SessionToken,
        display_name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            token,
            display_name: display_name.into(),
            email,
        }
    }

    pub fn into_session(self) -> GuestSession {
        GuestSession::new(self.token, self.display_name).with_email(self.email)
    }
}

/// Outcome of asking the server to mail a link (restore or device link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDispatch {
    pub success: bool,
    pub message: String,
}
