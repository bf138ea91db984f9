//! REST adapter for the conversations platform.
//!
//! Implements the `ConversationPlatform` trait against the platform's
//! form-encoded REST API with basic auth. Every call carries a bounded
//! timeout; a timeout is reported as a retryable dispatch failure, never as
//! conversation-state corruption.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::domain::attributes::AttributeDocument;
use crate::domain::conversation::ConversationRef;
use crate::domain::routing::{WebhookKind, TARGET_ASSISTANT_CALLBACK, TARGET_HUMAN_WORKFLOW};
use crate::ports::{
    ConversationPlatform, ConversationWebhook, NewMessage, PlatformError, WebhookTarget,
};

use super::wire::{ConversationResource, ParticipantPage, WebhookPage};

/// Trigger filter for assistant-callback subscriptions.
const MESSAGE_ADDED_FILTER: &str = "onMessageAdded";

/// Platform API configuration.
#[derive(Clone)]
pub struct PlatformRestConfig {
    /// Account sid used as the basic-auth username.
    account_sid: String,

    /// API auth token.
    auth_token: SecretString,

    /// Base URL for the conversations API.
    api_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl PlatformRestConfig {
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

/// Conversations platform REST adapter.
pub struct PlatformRestClient {
    config: PlatformRestConfig,
    http_client: reqwest::Client,
}

impl PlatformRestClient {
    pub fn new(config: PlatformRestConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn conversation_url(&self, conversation: &ConversationRef) -> String {
        format!(
            "{}/v1/Services/{}/Conversations/{}",
            self.config.api_base_url, conversation.service_sid, conversation.conversation_sid
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .timeout(self.config.request_timeout)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "platform API call failed");
            return Err(PlatformError::api(format!(
                "platform API error ({}): {}",
                status, error_text
            )));
        }
        Ok(response)
    }

    fn transport_error(err: reqwest::Error) -> PlatformError {
        if err.is_timeout() {
            PlatformError::timeout(err.to_string())
        } else {
            PlatformError::network(err.to_string())
        }
    }

    /// Decode the attributes blob the platform hands back.
    ///
    /// Empty or absent means the document was never written. Anything that
    /// is not a JSON object is a decode error: merging from a misread
    /// document would overwrite state another writer still relies on.
    fn parse_attributes(raw: Option<&str>) -> Result<AttributeDocument, PlatformError> {
        let raw = match raw {
            None | Some("") => return Ok(AttributeDocument::new()),
            Some(raw) => raw,
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => Err(PlatformError::decode(format!(
                "attributes document is not a JSON object: {}",
                other
            ))),
            Err(err) => Err(PlatformError::decode(format!(
                "attributes document is not valid JSON: {}",
                err
            ))),
        }
    }
}

#[async_trait]
impl ConversationPlatform for PlatformRestClient {
    async fn read_attributes(
        &self,
        conversation: &ConversationRef,
    ) -> Result<AttributeDocument, PlatformError> {
        let response = self
            .request(self.http_client.get(self.conversation_url(conversation)))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = self.check(response).await?;

        let resource: ConversationResource = response
            .json()
            .await
            .map_err(|err| PlatformError::decode(err.to_string()))?;

        Self::parse_attributes(resource.attributes.as_deref())
    }

    async fn write_attributes(
        &self,
        conversation: &ConversationRef,
        attributes: &AttributeDocument,
    ) -> Result<(), PlatformError> {
        let encoded = serde_json::to_string(attributes)
            .map_err(|err| PlatformError::decode(err.to_string()))?;

        let response = self
            .request(self.http_client.post(self.conversation_url(conversation)))
            .form(&[("Attributes", encoded.as_str())])
            .send()
            .await
            .map_err(Self::transport_error)?;
        self.check(response).await?;
        Ok(())
    }

    async fn participant_count(
        &self,
        conversation: &ConversationRef,
    ) -> Result<usize, PlatformError> {
        let url = format!("{}/Participants", self.conversation_url(conversation));
        let response = self
            .request(self.http_client.get(url))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = self.check(response).await?;

        let page: ParticipantPage = response
            .json()
            .await
            .map_err(|err| PlatformError::decode(err.to_string()))?;
        Ok(page.participants.len())
    }

    async fn create_message(
        &self,
        conversation: &ConversationRef,
        message: NewMessage,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/Messages", self.conversation_url(conversation));

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(body) = message.body {
            params.push(("Body", body));
        }
        if let Some(author) = message.author {
            params.push(("Author", author));
        }
        if let Some(content_sid) = message.content_sid {
            params.push(("ContentSid", content_sid));
        }
        if let Some(content_variables) = message.content_variables {
            params.push(("ContentVariables", content_variables));
        }

        let response = self
            .request(self.http_client.post(url))
            .form(&params)
            .send()
            .await
            .map_err(Self::transport_error)?;
        self.check(response).await?;
        Ok(())
    }

    async fn list_webhooks(
        &self,
        conversation: &ConversationRef,
    ) -> Result<Vec<ConversationWebhook>, PlatformError> {
        let url = format!("{}/Webhooks", self.conversation_url(conversation));
        let response = self
            .request(self.http_client.get(url))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = self.check(response).await?;

        let page: WebhookPage = response
            .json()
            .await
            .map_err(|err| PlatformError::decode(err.to_string()))?;

        Ok(page
            .webhooks
            .into_iter()
            .map(|webhook| ConversationWebhook {
                sid: webhook.sid,
                kind: WebhookKind::from_target(&webhook.target),
            })
            .collect())
    }

    async fn remove_webhook(
        &self,
        conversation: &ConversationRef,
        webhook_sid: &str,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/Webhooks/{}",
            self.conversation_url(conversation),
            webhook_sid
        );
        let response = self
            .request(self.http_client.delete(url))
            .send()
            .await
            .map_err(Self::transport_error)?;
        self.check(response).await?;
        Ok(())
    }

    async fn create_webhook(
        &self,
        conversation: &ConversationRef,
        target: WebhookTarget,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/Webhooks", self.conversation_url(conversation));

        let params: Vec<(&str, String)> = match target {
            WebhookTarget::AssistantCallback { url } => vec![
                ("Target", TARGET_ASSISTANT_CALLBACK.to_string()),
                ("Configuration.Method", "POST".to_string()),
                ("Configuration.Url", url),
                ("Configuration.Filters", MESSAGE_ADDED_FILTER.to_string()),
            ],
            WebhookTarget::HumanWorkflow { flow_sid } => vec![
                ("Target", TARGET_HUMAN_WORKFLOW.to_string()),
                ("Configuration.FlowSid", flow_sid),
            ],
        };

        let response = self
            .request(self.http_client.post(url))
            .form(&params)
            .send()
            .await
            .map_err(Self::transport_error)?;
        self.check(response).await?;
        Ok(())
    }
}
