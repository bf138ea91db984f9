//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid API base URL: {0}")]
    InvalidApiBaseUrl(&'static str),

    #[error("Callback base URL must be absolute")]
    InvalidCallbackBaseUrl,

    #[error("Callback base URL must use HTTPS in production")]
    CallbackMustBeHttps,

    #[error("Invalid signed-token TTL")]
    InvalidTokenTtl,

    #[error("Handover classification enumerations must not be empty")]
    EmptyClassificationEnums,
}
