//! Assistant service configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Default apology posted when a response cannot be delivered.
const DEFAULT_APOLOGY: &str = "¡Uy! Parece que algo falló al procesar tu mensaje 😅\n\n¿Te parece \
    si lo intentamos otra vez? Puedes repetir tu pregunta o escribirla de otra forma. ¡Estoy \
    listo para ayudarte! 💬";

/// Assistant service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    /// Assistant engaged when an event names none
    pub default_assistant_sid: String,

    /// Base URL for the assistant API
    #[serde(default = "default_assistant_url")]
    pub api_base_url: String,

    /// Public base URL of this service, used to mint callback URLs
    pub callback_base_url: String,

    /// Shared secret signing the callback tokens
    pub signing_secret: String,

    /// Validity window for signed callback tokens, in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,

    /// Apology posted when a response cannot be delivered
    #[serde(default = "default_apology")]
    pub apology_message: String,
}

impl AssistantConfig {
    /// Validate assistant configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.default_assistant_sid.is_empty() {
            return Err(ValidationError::MissingRequired(
                "ASSISTANT_DEFAULT_ASSISTANT_SID",
            ));
        }
        if self.signing_secret.is_empty() {
            return Err(ValidationError::MissingRequired("ASSISTANT_SIGNING_SECRET"));
        }
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidApiBaseUrl("assistant"));
        }
        if !self.callback_base_url.starts_with("http") {
            return Err(ValidationError::InvalidCallbackBaseUrl);
        }
        if *environment == Environment::Production && !self.callback_base_url.starts_with("https://")
        {
            return Err(ValidationError::CallbackMustBeHttps);
        }
        if self.token_ttl_secs <= 0 {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}

fn default_assistant_url() -> String {
    "https://assistants.example-platform.com".to_string()
}

fn default_token_ttl() -> i64 {
    crate::security::DEFAULT_TOKEN_TTL_SECS
}

fn default_apology() -> String {
    DEFAULT_APOLOGY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AssistantConfig {
        AssistantConfig {
            default_assistant_sid: "AI123".to_string(),
            api_base_url: default_assistant_url(),
            callback_base_url: "https://relay.example.com".to_string(),
            signing_secret: "secret".to_string(),
            token_ttl_secs: default_token_ttl(),
            apology_message: default_apology(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate(&Environment::Development).is_ok());
        assert!(valid().validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_missing_signing_secret() {
        let config = AssistantConfig {
            signing_secret: String::new(),
            ..valid()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_http_callback_rejected_in_production() {
        let config = AssistantConfig {
            callback_base_url: "http://relay.example.com".to_string(),
            ..valid()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let config = AssistantConfig {
            token_ttl_secs: 0,
            ..valid()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }
}
