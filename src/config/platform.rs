//! Conversations platform configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Conversations platform configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformConfig {
    /// Account sid used as the basic-auth username
    pub account_sid: String,

    /// API auth token
    pub auth_token: String,

    /// Base URL for the conversations API
    #[serde(default = "default_conversations_url")]
    pub api_base_url: String,
}

impl PlatformConfig {
    /// Validate platform configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.account_sid.is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM_ACCOUNT_SID"));
        }
        if self.auth_token.is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM_AUTH_TOKEN"));
        }
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidApiBaseUrl("platform"));
        }
        Ok(())
    }
}

fn default_conversations_url() -> String {
    "https://conversations.example-platform.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PlatformConfig {
        PlatformConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            api_base_url: default_conversations_url(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_account_sid() {
        let config = PlatformConfig {
            account_sid: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_auth_token() {
        let config = PlatformConfig {
            auth_token: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_base_url() {
        let config = PlatformConfig {
            api_base_url: "ftp://nope".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }
}
