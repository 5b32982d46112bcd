//! Configuration management for the FraudIntel backend
//!
//! This module handles loading and validating configuration from environment
//! variables. All variables use the `MFI_` prefix so the API server and the
//! ingestion worker can share one deployment environment.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Ethereum JSON-RPC provider URL
    pub eth_rpc_url: String,

    /// BNB Smart Chain JSON-RPC provider URL
    pub bsc_rpc_url: String,

    /// Polygon JSON-RPC provider URL
    pub polygon_rpc_url: String,

    /// Redis connection URL for the event stream
    pub redis_url: String,

    /// Name of the fraud event stream
    pub stream_name: String,

    /// Rate limit: requests per second per client
    pub rate_limit_rps: u32,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("MFI_APP_ENV")
            .map(|s| Environment::from_str(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("MFI_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("MFI_PORT must be a valid number".to_string()))?;

        let eth_rpc_url = env::var("MFI_ETH_RPC_URL")
            .unwrap_or_else(|_| "https://rpc.ankr.com/eth".to_string());

        let bsc_rpc_url = env::var("MFI_BSC_RPC_URL")
            .unwrap_or_else(|_| "https://rpc.ankr.com/bsc".to_string());

        let polygon_rpc_url = env::var("MFI_POLYGON_RPC_URL")
            .unwrap_or_else(|_| "https://rpc.ankr.com/polygon".to_string());

        let redis_url =
            env::var("MFI_REDIS_URL").unwrap_or_else(|_| "redis://redis:6379/0".to_string());

        let stream_name =
            env::var("MFI_STREAM_NAME").unwrap_or_else(|_| "fraud-events".to_string());

        let rate_limit_rps = env::var("MFI_RATE_LIMIT_RPS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u32>()
            .unwrap_or(100);

        let cors_allowed_origins = env::var("MFI_CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            environment,
            port,
            eth_rpc_url,
            bsc_rpc_url,
            polygon_rpc_url,
            redis_url,
            stream_name,
            rate_limit_rps,
            cors_allowed_origins,
            log_level,
        })
    }

    /// Map of chain name to JSON-RPC endpoint for the natively supported chains
    pub fn rpc_endpoints(&self) -> HashMap<String, String> {
        HashMap::from([
            ("ethereum".to_string(), self.eth_rpc_url.clone()),
            ("bsc".to_string(), self.bsc_rpc_url.clone()),
            ("polygon".to_string(), self.polygon_rpc_url.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            environment: Environment::Development,
            port: 8080,
            eth_rpc_url: "https://rpc.ankr.com/eth".to_string(),
            bsc_rpc_url: "https://rpc.ankr.com/bsc".to_string(),
            polygon_rpc_url: "https://rpc.ankr.com/polygon".to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            stream_name: "fraud-events".to_string(),
            rate_limit_rps: 100,
            cors_allowed_origins: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!(
            Environment::from_str("dev").unwrap(),
            Environment::Development
        );
        assert_eq!(
            Environment::from_str("development").unwrap(),
            Environment::Development
        );
        assert_eq!(
            Environment::from_str("staging").unwrap(),
            Environment::Staging
        );
        assert_eq!(
            Environment::from_str("prod").unwrap(),
            Environment::Production
        );

        // Case insensitive
        assert_eq!(
            Environment::from_str("PROD").unwrap(),
            Environment::Production
        );

        // Invalid
        assert!(Environment::from_str("invalid").is_err());
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_rpc_endpoints_cover_supported_chains() {
        let endpoints = test_config().rpc_endpoints();

        assert_eq!(endpoints.len(), 3);
        assert_eq!(
            endpoints.get("ethereum").map(String::as_str),
            Some("https://rpc.ankr.com/eth")
        );
        assert_eq!(
            endpoints.get("bsc").map(String::as_str),
            Some("https://rpc.ankr.com/bsc")
        );
        assert_eq!(
            endpoints.get("polygon").map(String::as_str),
            Some("https://rpc.ankr.com/polygon")
        );
    }

    #[test]
    fn test_config_error_types() {
        let err = ConfigError::InvalidPort("MFI_PORT must be a valid number".to_string());
        assert!(err.to_string().contains("MFI_PORT"));

        let err = ConfigError::InvalidValue("bad".to_string());
        assert!(err.to_string().contains("bad"));
    }
}
