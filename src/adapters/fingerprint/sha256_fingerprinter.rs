//! SHA-256 device fingerprint.
//!
//! Hashes the device traits once at construction; every later call returns
//! the same identifier.

use sha2::{Digest, Sha256};

use crate::ports::DeviceFingerprinter;

/// Length of the hex identifier sent to the server.
const FINGERPRINT_HEX_LEN: usize = 16;

/// Environment signals mixed into the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTraits {
    pub user_agent: String,
    pub locale: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub timezone_offset_minutes: i32,
    pub canvas_signature: String,
}

impl DeviceTraits {
    /// Traits of the current process host.
    ///
    /// Headless hosts have no screen or canvas; geometry is zero and the
    /// canvas signature falls back to the OS family.
    pub fn from_host() -> Self {
        let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "en-US".to_string());

        let offset_seconds = chrono::Local::now().offset().local_minus_utc();

        Self {
            user_agent: format!(
                "{}/{} ({}; {})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            locale,
            screen_width: 0,
            screen_height: 0,
            timezone_offset_minutes: -(offset_seconds / 60),
            canvas_signature: std::env::consts::FAMILY.to_string(),
        }
    }

    fn canonical(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.user_agent,
            self.locale,
            self.screen_width,
            self.screen_height,
            self.timezone_offset_minutes,
            self.canvas_signature
        )
    }
}

/// Fingerprinter hashing [`DeviceTraits`] with SHA-256.
#[derive(Debug, Clone)]
pub struct Sha256Fingerprinter {
    identifier: String,
}

impl Sha256Fingerprinter {
    pub fn new(traits: DeviceTraits) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(traits.canonical().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self {
            identifier: digest[..FINGERPRINT_HEX_LEN].to_string(),
        }
    }

    /// Fingerprinter over [`DeviceTraits::from_host`].
    pub fn from_host() -> Self {
        Self::new(DeviceTraits::from_host())
    }
}

impl DeviceFingerprinter for Sha256Fingerprinter {
    fn fingerprint(&self) -> String {
        self.identifier.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn traits() -> DeviceTraits {
        DeviceTraits {
            user_agent: "Mozilla/5.0".to_string(),
            locale: "hu-HU".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            timezone_offset_minutes: -60,
            canvas_signature: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let fp = Sha256Fingerprinter::new(traits()).fingerprint();
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_traits_give_different_fingerprints() {
        let mut other = traits();
        other.screen_width = 1280;
        assert_ne!(
            Sha256Fingerprinter::new(traits()).fingerprint(),
            Sha256Fingerprinter::new(other).fingerprint()
        );
    }

    #[test]
    fn host_fingerprint_is_stable_across_calls() {
        let fingerprinter = Sha256Fingerprinter::from_host();
        assert_eq!(fingerprinter.fingerprint(), fingerprinter.fingerprint());
    }

    proptest! {
        #[test]
        fn equal_traits_always_hash_equal(
            ua in ".{0,64}",
            locale in "[a-z]{2}-[A-Z]{2}",
            w in 0u32..8000,
            h in 0u32..8000,
            tz in -720i32..840,
        ) {
            let traits = DeviceTraits {
                user_agent: ua,
                locale,
                screen_width: w,
                screen_height: h,
                timezone_offset_minutes: tz,
                canvas_signature: "canvas".to_string(),
            };
            prop_assert_eq!(
                Sha256Fingerprinter::new(traits.clone()).fingerprint(),
                Sha256Fingerprinter::new(traits).fingerprint()
            );
        }
    }
}
