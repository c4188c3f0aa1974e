//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub manifest: ManifestConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether to expose the OpenAPI document. Should be false in hardened
    /// production.
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any (development only).
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_docs: true,
            request_timeout_seconds: 30,
            allowed_origins: vec!["*".to_string()],
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Requests allowed per window, per client key
    pub requests_per_window: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// Interval of the expired-entry eviction sweep in seconds
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_window: 60,
            window_seconds: 60,
            sweep_interval_seconds: 300,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Source-control provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL; override for GitHub Enterprise or tests.
    pub api_base: String,
    /// Personal access token or installation token, if available.
    pub token: Option<String>,
    /// Public base URL of this service, used to build webhook callback URLs.
    pub callback_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            callback_base: "http://localhost:3000".to_string(),
        }
    }
}

/// Manifest convention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Exact basename that marks a file as a status manifest.
    pub filename: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            filename: "vibe.json".to_string(),
        }
    }
}

/// Health sweep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Whether the periodic sweep worker runs.
    pub sweep_enabled: bool,
    /// Sweep interval in seconds.
    pub sweep_interval_seconds: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            sweep_enabled: true,
            sweep_interval_seconds: 3600,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Output format: "json" or "pretty".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.github.validate()?;
        self.manifest.validate()?;
        self.health.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("VIBEWATCH").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_manifest_filename_is_vibe_json() {
        assert_eq!(Config::default().manifest.filename, "vibe.json");
    }

    #[test]
    fn rate_limit_window_converts_to_duration() {
        let config = RateLimitConfig {
            window_seconds: 90,
            ..RateLimitConfig::default()
        };
        assert_eq!(config.window(), Duration::from_secs(90));
    }
}
