//! Device fingerprint port - anti-abuse correlation signal sent on registration.
//!
//! The fingerprint is not an identity. The only requirement is that it stays
//! stable across calls within one process lifetime.

/// Produces the device identifier attached to registration requests.
pub trait DeviceFingerprinter: Send + Sync {
    fn fingerprint(&self) -> String;
}
