//! Configuration management for the stock tracking server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STK_ prefix

use chrono_tz::Tz;
use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    /// Invoice extraction service
    pub extraction: ExtractionConfig,

    pub upload: UploadConfig,

    pub reporting: ReportingConfig,

    pub realtime: RealtimeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Base URL; `/extract-stock` is appended
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum multipart body size in bytes
    pub max_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportingConfig {
    /// Business timezone as an IANA name, e.g. `Europe/Bucharest`
    pub timezone: Tz,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    /// Buffered messages per subscriber before it starts lagging
    pub channel_capacity: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("STK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("extraction.base_url", "http://localhost:8000")?
            .set_default("extraction.timeout_secs", 120)?
            .set_default("upload.max_bytes", 20 * 1024 * 1024)?
            .set_default("reporting.timezone", "Europe/Bucharest")?
            .set_default("realtime.channel_capacity", 256)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STK_ prefix)
            .add_source(
                Environment::with_prefix("STK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporting(timezone: &str) -> Result<ReportingConfig, ConfigError> {
        config::Config::builder()
            .set_override("timezone", timezone)?
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_reporting_timezone_parses_iana_name() {
        let config = reporting("Europe/Bucharest").unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Bucharest);
    }

    #[test]
    fn test_reporting_timezone_rejects_unknown_name() {
        assert!(reporting("Europe/Atlantis").is_err());
    }
}
