//! Application layer - guest session components and the facade wiring them.
//!
//! - `SessionStore` - in-memory identity, write-through to storage
//! - `IdentityRegistrar` - registration and profile edits
//! - `SessionValidator` - stored-session validation, heartbeats
//! - `StatusPoller` - generic single-flight poller, run as liveness and verification
//! - `RestoreBroker` - restore links and handed-over sessions
//! - `InvalidationBus` / `SessionInvalidator` - stop, clear, emit
//! - `ConflictResolutionGateway` - organizer claim decisions
//! - `GuestSessionCore` - the facade

mod claims;
mod guest_core;
mod invalidation;
mod liveness;
mod poller;
mod registrar;
mod restore;
mod session_store;
mod validator;
mod verification;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::ConflictResolutionGateway;
pub use guest_core::{GuestCoreDeps, GuestSessionCore, PollingIntervals, GUEST_SESSION_HEADER};
pub use invalidation::{InvalidationBus, SessionInvalidator};
pub use liveness::LivenessCheck;
pub use poller::{PollDirective, PollerSwitch, StatusCheck, StatusPoller};
pub use registrar::{IdentifiedSession, IdentityRegistrar};
pub use restore::RestoreBroker;
pub use session_store::{GuestState, SessionStore};
pub use validator::SessionValidator;
pub use verification::VerificationCheck;
