//! Device fingerprint adapters.

mod sha256_fingerprinter;

pub use sha256_fingerprinter::{DeviceTraits, Sha256Fingerprinter};
