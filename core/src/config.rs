//! Connection settings for a [`crate::ManagementApi`].

use std::time::Duration;

use serde::Deserialize;

pub const DOMAIN_VAR: &str = "MGMT_DOMAIN";
pub const API_TOKEN_VAR: &str = "MGMT_API_TOKEN";
pub const TIMEOUT_VAR: &str = "MGMT_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Domain, token and transport timeout.
#[derive(Clone, Deserialize)]
pub struct Config {
    pub domain: String,
    pub api_token: String,
    /// Whole-exchange timeout in seconds. `None` leaves the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn new(domain: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            api_token: api_token.into(),
            timeout_secs: None,
        }
    }

    /// Read `MGMT_DOMAIN`, `MGMT_API_TOKEN` and the optional `MGMT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let domain = lookup(DOMAIN_VAR).ok_or(ConfigError::Missing(DOMAIN_VAR))?;
        let api_token = lookup(API_TOKEN_VAR).ok_or(ConfigError::Missing(API_TOKEN_VAR))?;
        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: TIMEOUT_VAR,
                value: raw,
            })?),
            None => None,
        };
        Ok(Self {
            domain,
            api_token,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
