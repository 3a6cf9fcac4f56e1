//! Server configuration, read from the environment at startup.

use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
const DEFAULT_SOLANA_RPC_URL: &str = "https://api.devnet.solana.com";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Base URL of the platform backend that owns vault positions
    pub backend_url: String,

    pub solana_rpc_url: String,

    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,

    /// Allowed CORS origins; any origin when empty
    pub cors_origins: Vec<String>,

    /// Transport timeout for collaborator clients
    pub http_timeout: Duration,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `SENTI_BACKEND_API_URL`, `SOLANA_RPC_URL`,
    /// `JWT_SECRET` and `CORS_ORIGINS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            bind_addr: var("BIND_ADDR", DEFAULT_BIND_ADDR),
            backend_url: var("SENTI_BACKEND_API_URL", DEFAULT_BACKEND_URL),
            solana_rpc_url: var("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL),
            jwt_secret,
            cors_origins: parse_origins(&var("CORS_ORIGINS", "")),
            http_timeout: Duration::from_secs(10),
        })
    }
}

/// Comma separated origins. `*` or nothing means any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.backend_url, "http://localhost:5000/api");
        assert_eq!(config.solana_rpc_url, "https://api.devnet.solana.com");
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_secret_is_required() {
        assert_eq!(config_from(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        assert!(config_from(&[("JWT_SECRET", "  ")]).is_err());
    }

    #[test]
    fn test_cors_origins() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cret"),
            ("CORS_ORIGINS", "http://localhost:3002, https://app.example.com,"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3002", "https://app.example.com"]
        );
        assert!(parse_origins("*").is_empty());
    }
}
