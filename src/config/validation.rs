//! Configuration validation module

use crate::config::{GitHubConfig, HealthConfig, ManifestConfig, ServerConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("GitHub configuration error: {message}")]
    GitHub { message: String },

    #[error("Manifest configuration error: {message}")]
    Manifest { message: String },

    #[error("Health configuration error: {message}")]
    Health { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn github(message: impl Into<String>) -> Self {
        Self::GitHub {
            message: message.into(),
        }
    }

    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }

    pub fn health(message: impl Into<String>) -> Self {
        Self::Health {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::server("Port cannot be 0"));
        }
        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0",
            ));
        }
        if self.rate_limit.enabled {
            if self.rate_limit.requests_per_window == 0 {
                return Err(ValidationError::server(
                    "Rate limit requests_per_window must be greater than 0",
                ));
            }
            if self.rate_limit.window_seconds == 0 {
                return Err(ValidationError::server(
                    "Rate limit window_seconds must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}

impl Validate for GitHubConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.api_base.is_empty() {
            return Err(ValidationError::github("API base URL cannot be empty"));
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ValidationError::github(format!(
                "API base URL must be http(s), got '{}'",
                self.api_base
            )));
        }
        if self.callback_base.is_empty() {
            return Err(ValidationError::github("Callback base URL cannot be empty"));
        }
        Ok(())
    }
}

impl Validate for ManifestConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.filename.is_empty() {
            return Err(ValidationError::manifest(
                "Manifest filename cannot be empty",
            ));
        }
        if self.filename.contains('/') {
            return Err(ValidationError::manifest(
                "Manifest filename must be a basename, not a path",
            ));
        }
        Ok(())
    }
}

impl Validate for HealthConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_enabled && self.sweep_interval_seconds == 0 {
            return Err(ValidationError::health(
                "Sweep interval must be greater than 0 when the sweep is enabled",
            ));
        }
        Ok(())
    }
}
