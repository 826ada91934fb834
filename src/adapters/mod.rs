//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the guest session core to external systems:
//! - `guest_api` - reqwest client for the guest and organizer endpoints
//! - `storage` - session record storage (file, in-memory)
//! - `fingerprint` - device fingerprint generation
//! - `scope` - host-settable active scope

pub mod fingerprint;
pub mod guest_api;
pub mod scope;
pub mod storage;

pub use fingerprint::{DeviceTraits, Sha256Fingerprinter};
pub use guest_api::{HttpGuestApi, HttpGuestApiConfig};
pub use scope::SwitchableScopeProvider;
pub use storage::{FileSessionStorage, InMemorySessionStorage};
