//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `GUEST_SESSION`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use guest_session::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Guest API at {}", config.api.base_url);
//! ```

mod api;
mod error;
mod polling;
mod runtime;
mod scope;
mod storage;

pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use polling::PollingConfig;
pub use runtime::{Environment, RuntimeConfig};
pub use scope::ScopeConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Runtime configuration (environment, logging)
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Guest API client configuration
    pub api: ApiConfig,

    /// Poller and heartbeat cadence
    #[serde(default)]
    pub polling: PollingConfig,

    /// Where session records are kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scope the process starts in
    #[serde(default)]
    pub scope: ScopeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GUEST_SESSION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GUEST_SESSION__API__BASE_URL=...` -> `api.base_url = ...`
    /// - `GUEST_SESSION__POLLING__LIVENESS_INTERVAL_SECS=30` -> `polling.liveness_interval_secs = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GUEST_SESSION")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate(self.is_production())?;
        self.polling.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}
