//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `ASSISTANT_RELAY` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use assistant_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Relay listening on {}", config.server.socket_addr());
//! ```

mod assistant;
mod error;
mod handover;
mod platform;
mod server;

pub use assistant::AssistantConfig;
pub use error::{ConfigError, ValidationError};
pub use handover::HandoverSettings;
pub use platform::PlatformConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversations platform configuration (API credentials)
    pub platform: PlatformConfig,

    /// Assistant service configuration (sid, callback signing)
    pub assistant: AssistantConfig,

    /// Human-workflow handover configuration
    #[serde(default)]
    pub handover: HandoverSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `ASSISTANT_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ASSISTANT_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ASSISTANT_RELAY__PLATFORM__ACCOUNT_SID=...` -> `platform.account_sid = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required environment variables are missing
    /// or values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ASSISTANT_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.platform.validate()?;
        self.assistant.validate(&self.server.environment)?;
        self.handover.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
