//! Terminal, server-driven session invalidation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::EventId;

/// Why the server terminated a guest session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationReason {
    Banned,
    Deleted,
    Rejected,
}

impl InvalidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationReason::Banned => "banned",
            InvalidationReason::Deleted => "deleted",
            InvalidationReason::Rejected => "rejected",
        }
    }

    /// Message shown when the server did not supply one.
    pub fn default_message(&self) -> &'static str {
        match self {
            InvalidationReason::Banned => "Access denied. Please contact the organizers.",
            InvalidationReason::Deleted => "Your guest session has been removed.",
            InvalidationReason::Rejected => {
                "Your request was rejected. Please choose a different name."
            }
        }
    }
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One occurrence of a session invalidation. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationEvent {
    pub event_id: EventId,
    pub reason: InvalidationReason,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl InvalidationEvent {
    pub fn new(reason: InvalidationReason, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            reason.default_message().to_string()
        } else {
            message
        };
        Self {
            event_id: EventId::new(),
            reason,
            message,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_keeps_server_message() {
        let event = InvalidationEvent::new(InvalidationReason::Banned, "You were banned");
        assert_eq!(event.reason, InvalidationReason::Banned);
        assert_eq!(event.message, "You were banned");
    }

    #[test]
    fn blank_message_falls_back_to_reason_default() {
        let event = InvalidationEvent::new(InvalidationReason::Deleted, "  ");
        assert_eq!(event.message, InvalidationReason::Deleted.default_message());
    }

    #[test]
    fn banned_without_message_tells_guest_to_contact_organizers() {
        let event = InvalidationEvent::new(InvalidationReason::Banned, "");
        assert_eq!(event.message, "Access denied. Please contact the organizers.");
    }

    #[test]
    fn reasons_deserialize_from_lowercase() {
        let reason: InvalidationReason = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(reason, InvalidationReason::Rejected);
    }
}
