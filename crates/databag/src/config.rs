//! Configuration loading and validation for the databag service.
//!
//! All values are read from `CHEF_`-prefixed environment variables at
//! startup. The process exits with a clear error if a value is invalid.

use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::{SchemeVersion, Secret};

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Shared secret for item encryption (`CHEF_SECRET_KEY`). Empty disables encryption.
    #[serde(default)]
    pub secret_key: String,

    /// File holding the shared secret (`CHEF_SECRET_KEY_PATH`).
    #[serde(default)]
    pub secret_key_path: Option<String>,

    /// Scheme version for new encryptions (`CHEF_ENCRYPTION_VERSION`).
    #[serde(default = "default_encryption_version")]
    pub encryption_version: i64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP collector endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_encryption_version() -> i64 {
    i64::from(SchemeVersion::LATEST.as_u8())
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("CHEF"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.secret_key_path.is_some() && !self.secret_key.trim().is_empty() {
            anyhow::bail!("set only one of CHEF_SECRET_KEY and CHEF_SECRET_KEY_PATH");
        }
        SchemeVersion::try_from(self.encryption_version)
            .context("CHEF_ENCRYPTION_VERSION must be 1, 2 or 3")?;
        if self.listen_port == 0 {
            anyhow::bail!("CHEF_LISTEN_PORT must be > 0");
        }
        Ok(())
    }

    /// Scheme version used for new encryptions.
    pub fn scheme_version(&self) -> Result<SchemeVersion> {
        SchemeVersion::try_from(self.encryption_version)
            .context("CHEF_ENCRYPTION_VERSION must be 1, 2 or 3")
    }

    /// Resolve the shared secret, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if `secret_key_path` is set but cannot be read.
    pub fn secret(&self) -> Result<Secret> {
        match &self.secret_key_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read secret key file {path}"))?;
                Ok(Secret::from(raw.trim()))
            }
            None => Ok(Secret::from(self.secret_key.trim())),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"[REDACTED]")
            .field("secret_key_path", &self.secret_key_path)
            .field("encryption_version", &self.encryption_version)
            .field("listen_port", &self.listen_port)
            .field("log_level", &self.log_level)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .finish()
    }
}
