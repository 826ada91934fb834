//! Polling cadence configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::PollingIntervals;

const MAX_INTERVAL_SECS: u64 = 3600;

/// Polling cadence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Seconds between session-status checks
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval_secs: u64,

    /// Seconds between verification-status checks
    #[serde(default = "default_verification_interval")]
    pub verification_interval_secs: u64,

    /// Seconds between heartbeats; unset disables heartbeats
    pub heartbeat_interval_secs: Option<u64>,
}

impl PollingConfig {
    pub fn intervals(&self) -> PollingIntervals {
        PollingIntervals {
            liveness: Duration::from_secs(self.liveness_interval_secs),
            verification: Duration::from_secs(self.verification_interval_secs),
        }
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval_secs.map(Duration::from_secs)
    }

    /// Validate polling configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_interval("polling.liveness_interval_secs", self.liveness_interval_secs)?;
        check_interval(
            "polling.verification_interval_secs",
            self.verification_interval_secs,
        )?;
        if let Some(secs) = self.heartbeat_interval_secs {
            check_interval("polling.heartbeat_interval_secs", secs)?;
        }
        Ok(())
    }
}

fn check_interval(name: &'static str, secs: u64) -> Result<(), ValidationError> {
    if secs == 0 || secs > MAX_INTERVAL_SECS {
        return Err(ValidationError::InvalidPollingInterval(name));
    }
    Ok(())
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            liveness_interval_secs: default_liveness_interval(),
            verification_interval_secs: default_verification_interval(),
            heartbeat_interval_secs: None,
        }
    }
}

fn default_liveness_interval() -> u64 {
    30
}

fn default_verification_interval() -> u64 {
    5
}
