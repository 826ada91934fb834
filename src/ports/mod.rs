//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the guest session core and the outside world. Adapters implement these ports.
//!
//! - `SessionStorage` - durable per-scope record storage
//! - `GuestApi` - guest-facing server endpoints
//! - `ClaimAdminApi` - organizer-only claim resolution endpoints
//! - `ActiveScopeProvider` - which project/session kind the host shows
//! - `DeviceFingerprinter` - anti-abuse device identifier

mod claim_admin;
mod device_fingerprint;
mod guest_api;
mod scope_provider;
mod session_storage;

pub use claim_admin::ClaimAdminApi;
pub use device_fingerprint::DeviceFingerprinter;
pub use guest_api::{
    GuestApi, IdentificationRequest, IdentifiedGuest, RegisteredGuest, RegistrationRequest,
    SessionStatusReport, SessionValidation, UpdatedProfile, VerificationReport,
};
pub use scope_provider::ActiveScopeProvider;
pub use session_storage::{SessionStorage, SessionStorageError};
