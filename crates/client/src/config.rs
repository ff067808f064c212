//! Client configuration loading and validation.
//!
//! All values are read from `PORTADATA_*` environment variables and fall back
//! to defaults suitable for the hosted API.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the remote store API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Total per-request timeout in seconds (connect, headers, body).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.portadata.io/v1".into()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from `PORTADATA_*` environment variables
    /// (e.g. `PORTADATA_API_URL`), falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("PORTADATA"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Build a configuration for a custom API endpoint, keeping default
    /// timeouts.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("PORTADATA_API_URL must not be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("PORTADATA_REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("PORTADATA_CONNECT_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }
}
