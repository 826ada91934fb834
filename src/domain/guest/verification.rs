//! Verification state of a guest's claimed roster identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PersonId, StateMachine};

/// Organizer-side verdict on a guest's identity claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Verified,
    Pending,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl StateMachine for VerificationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use VerificationStatus::*;
        matches!((self, target), (Pending, Verified) | (Pending, Rejected))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use VerificationStatus::*;
        match self {
            Pending => vec![Verified, Rejected],
            Verified | Rejected => vec![],
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification status plus the roster person the guest claimed to be.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationState {
    pub status: VerificationStatus,
    pub matched_person_id: Option<PersonId>,
    pub matched_person_name: Option<String>,
}

impl VerificationState {
    pub fn new(
        status: VerificationStatus,
        matched_person_id: Option<PersonId>,
        matched_person_name: Option<String>,
    ) -> Self {
        Self {
            status,
            matched_person_id,
            matched_person_name,
        }
    }

    /// State with only a status and no roster match.
    pub fn with_status(status: VerificationStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Derived from the status; never stored separately.
    pub fn is_pending(&self) -> bool {
        self.status == VerificationStatus::Pending
    }

    pub fn has_person_identification(&self) -> bool {
        self.matched_person_id.is_some()
    }

    /// Applies a status reported by the server, keeping the roster match.
    pub fn with_reported_status(&self, status: VerificationStatus) -> Self {
        if self.status != status && !self.status.can_transition_to(&status) {
            tracing::debug!(
                from = %self.status,
                to = %status,
                "server reported an out-of-order verification status"
            );
        }
        Self {
            status,
            matched_person_id: self.matched_person_id,
            matched_person_name: self.matched_person_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_verified_without_match() {
        let state = VerificationState::default();
        assert_eq!(state.status, VerificationStatus::Verified);
        assert!(!state.is_pending());
        assert!(!state.has_person_identification());
    }

    #[test]
    fn pending_resolves_to_terminal_statuses_only() {
        let pending = VerificationStatus::Pending;
        assert!(pending.can_transition_to(&VerificationStatus::Verified));
        assert!(pending.can_transition_to(&VerificationStatus::Rejected));
        assert!(VerificationStatus::Verified.is_terminal());
        assert!(VerificationStatus::Rejected.is_terminal());
        assert!(VerificationStatus::Verified
            .transition_to(VerificationStatus::Pending)
            .is_err());
    }

    #[test]
    fn reported_status_keeps_roster_match() {
        let state = VerificationState::new(
            VerificationStatus::Pending,
            Some(PersonId::new(42)),
            Some("Jane Doe".to_string()),
        );
        let next = state.with_reported_status(VerificationStatus::Verified);
        assert_eq!(next.status, VerificationStatus::Verified);
        assert_eq!(next.matched_person_id, Some(PersonId::new(42)));
        assert_eq!(next.matched_person_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&VerificationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let parsed: VerificationStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, VerificationStatus::Rejected);
    }
}
