//! Guest module - anonymous participant identity for one project scope.

mod claim;
mod errors;
mod input;
mod invalidation;
mod restore;
mod scope;
mod session;
mod verification;

pub use claim::{ClaimResolution, PendingClaim, PersonMatch};
pub use errors::{
    GuestError, GENERIC_FAILURE_MESSAGE, OFFLINE_MESSAGE, RATE_LIMITED_MESSAGE,
};
pub use input::{normalize_optional_email, validate_email, validate_name};
pub use invalidation::{InvalidationEvent, InvalidationReason};
pub use restore::{LinkDispatch, RestoredSession};
pub use scope::{SessionKind, SessionScope};
pub use session::{GuestSession, SessionToken, StoredSessionRecord};
pub use verification::{VerificationState, VerificationStatus};
