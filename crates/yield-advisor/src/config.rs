//! Advisor configuration, read from the environment at startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::PoolCatalog;
use crate::context::DEFAULT_FETCH_TIMEOUT;
use crate::engine::DEFAULT_MAX_RISK_SCORE;
use crate::error::{AdvisorError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct AdvisorConfig {
    /// Highest pool risk score a suggestion may use
    pub max_risk_score: u8,

    /// Deadline for each data-source fetch
    pub fetch_timeout: Duration,

    /// JSON pool catalog; the built-in catalog when unset
    pub pool_catalog_path: Option<PathBuf>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_risk_score: DEFAULT_MAX_RISK_SCORE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            pool_catalog_path: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    parse_setting(key, std::env::var(key).ok())
}

/// Unset or blank means the default; anything else must parse.
fn parse_setting<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AdvisorError::Config(format!("{key} has invalid value '{raw}'"))),
        _ => Ok(None),
    }
}

impl AdvisorConfig {
    /// Reads `MAX_RISK_SCORE`, `CONTEXT_FETCH_TIMEOUT_SECS` and `POOL_CATALOG_PATH`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let fetch_timeout = match env_parse::<u64>("CONTEXT_FETCH_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(AdvisorError::Config(
                    "CONTEXT_FETCH_TIMEOUT_SECS must be at least 1".into(),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.fetch_timeout,
        };

        Ok(Self {
            max_risk_score: env_parse("MAX_RISK_SCORE")?.unwrap_or(defaults.max_risk_score),
            fetch_timeout,
            pool_catalog_path: env_parse::<PathBuf>("POOL_CATALOG_PATH")?,
        })
    }

    /// The configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<PoolCatalog> {
        match &self.pool_catalog_path {
            Some(path) => PoolCatalog::from_json_file(path),
            None => Ok(PoolCatalog::default()),
        }
    }
}
