//! Roster matching and organizer-side claim resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClaimId, PersonId};

/// A roster person returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonMatch {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    /// Whether some guest already claimed this person.
    #[serde(default)]
    pub has_guest: bool,
}

/// A roster-identity claim waiting for an organizer decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClaim {
    pub claim_id: ClaimId,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub person_id: Option<PersonId>,
    pub person_name: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
}

/// Server answer to an approve/deny decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResolution {
    pub claim_id: ClaimId,
    pub approved: bool,
    pub message: String,
}
