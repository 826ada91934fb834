//! Guest API client configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::HttpGuestApiConfig;

/// Guest API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root, including any deployment prefix (e.g. `/tablo-frontend`)
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Bearer token for the organizer claim endpoints
    pub admin_token: Option<Secret<String>>,
}

impl ApiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the HTTP adapter configuration.
    pub fn client_config(&self) -> HttpGuestApiConfig {
        let config = HttpGuestApiConfig::new(self.base_url.trim_end_matches('/'))
            .with_timeout(self.timeout());
        match &self.admin_token {
            Some(token) => config.with_admin_token(token.clone()),
            None => config,
        }
    }

    /// Validate API configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("api.base_url"));
        }
        let https = self.base_url.starts_with("https://");
        if !https && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if production && !https {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    10
}
