//! Configuration management for the Crop Yield Advisor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides: `CYA__SECTION__KEY` (prefix `CYA`,
//!    separator `__`), e.g. `CYA__DATABASE__URL`. Only the environment name
//!    itself is read from `CYA_ENVIRONMENT`.

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::prediction::PredictorParams;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Log output format: "pretty" or "json"
    pub log_format: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Bearer token verification
    pub auth: AuthConfig,

    /// External ML prediction service
    pub ml: MlConfig,

    /// Local prediction tuning
    #[serde(default)]
    pub predictor: PredictorParams,

    /// Historical data import
    #[serde(default)]
    pub import: ImportConfig,
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
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,

    /// Expected `aud` claim; audience is not checked when unset
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MlConfig {
    /// Base URL of the prediction service; the tier is skipped when unset
    pub api_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Largest CSV body accepted by the import endpoint, in bytes
    pub max_body_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl MlConfig {
    /// Configured base URL, ignoring blank values
    pub fn base_url(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CYA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("log_format", "pretty")?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("ml.timeout_secs", 10)?
            .set_default("import.max_body_bytes", 64 * 1024 * 1024)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CYA__SECTION__KEY)
            .add_source(
                Environment::with_prefix("CYA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
