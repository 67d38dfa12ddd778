//! Client configuration module
//!
//! Settings for the client sync driver: where the collaboration socket lives
//! and how long local edits are coalesced before being sent.

use std::time::Duration;
use thiserror::Error;

/// Coalescing window applied to local edits when none is configured
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(120);

/// Upper bound on the coalescing window; longer windows make peers drift
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(2);

/// Client configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Collaboration socket URL (`ws://` or `wss://`)
    pub server_url: Option<String>,
    /// Coalescing window for local edits
    pub debounce: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("ws://") || url.starts_with("wss://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.debounce.is_zero() || self.debounce > MAX_DEBOUNCE {
            return Err(ConfigError::InvalidDebounce(self.debounce));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    debounce: Option<Duration>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the coalescing window for local edits
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            server_url: self.server_url,
            debounce: self.debounce.unwrap_or(DEFAULT_DEBOUNCE),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("debounce window out of range: {0:?}")]
    InvalidDebounce(Duration),
}
