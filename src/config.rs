//! Verification defaults.
//!
//! Values come from the environment (`SIGCHECK_PREFIX`, `SIGCHECK_MODE`).
//! Callers that want `.env` support load it before calling [`Config::from_env`].

use std::env;

use crate::error::{Result, SigcheckError};
use crate::hasher::HashMode;

pub const PREFIX_VAR: &str = "SIGCHECK_PREFIX";
pub const MODE_VAR: &str = "SIGCHECK_MODE";

pub const DEFAULT_PREFIX: &str = "cosmos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bech32 prefix used when a request doesn't name one.
    pub default_prefix: String,
    /// Hash mode used when a request doesn't name one.
    pub default_mode: HashMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_prefix: DEFAULT_PREFIX.to_string(),
            default_mode: HashMode::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(prefix) = lookup(PREFIX_VAR) {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                return Err(SigcheckError::Config(format!("{} is set but empty", PREFIX_VAR)));
            }
            bech32::Hrp::parse(prefix)
                .map_err(|e| SigcheckError::Config(format!("{}: invalid prefix: {}", PREFIX_VAR, e)))?;
            config.default_prefix = prefix.to_string();
        }

        if let Some(mode) = lookup(MODE_VAR) {
            config.default_mode = mode
                .parse()
                .map_err(|e: SigcheckError| SigcheckError::Config(format!("{}: {}", MODE_VAR, e)))?;
        }

        tracing::debug!(prefix = %config.default_prefix, mode = %config.default_mode, "loaded config");
        Ok(config)
    }
}
