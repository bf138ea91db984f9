//! REST adapter for the assistant service.
//!
//! Posts the conversation message as JSON and returns as soon as the
//! assistant acknowledges receipt; the actual response arrives later via
//! the signed callback URL embedded in the request.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{AssistantClient, AssistantDispatch, AssistantError};

/// Assistant API configuration.
#[derive(Clone)]
pub struct AssistantRestConfig {
    /// Account sid used as the basic-auth username.
    account_sid: String,

    /// API auth token.
    auth_token: SecretString,

    /// Base URL for the assistant API.
    api_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl AssistantRestConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: SecretString::new(auth_token.into()),
            api_base_url: api_base_url.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Assistant service REST adapter.
pub struct AssistantRestClient {
    config: AssistantRestConfig,
    http_client: reqwest::Client,
}

impl AssistantRestClient {
    pub fn new(config: AssistantRestConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AssistantClient for AssistantRestClient {
    async fn send_message(
        &self,
        assistant_sid: &str,
        request: AssistantDispatch,
    ) -> Result<(), AssistantError> {
        let url = format!(
            "{}/v1/Assistants/{}/Messages",
            self.config.api_base_url, assistant_sid
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AssistantError::timeout(err.to_string())
                } else {
                    AssistantError::network(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "assistant dispatch rejected");
            return Err(AssistantError::api(format!(
                "assistant API error ({}): {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
