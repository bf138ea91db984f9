//! Conversations platform port.
//!
//! Narrow contract over the hosting platform's conversation resources: the
//! shared attributes document, the participant roster, messages, and the
//! event-subscription list.
//!
//! # Design
//!
//! - **No atomic update**: the platform stores attributes as one JSON blob;
//!   `write_attributes` overwrites the whole document. The merge policy
//!   lives with the caller ([`crate::application::AttributeAccessor`]).
//! - **Read-only roster**: participant cardinality is inspected to detect a
//!   human join, never mutated here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::attributes::AttributeDocument;
use crate::domain::conversation::ConversationRef;
use crate::domain::errors::{ErrorCode, RelayError};
use crate::domain::routing::WebhookKind;

/// Port for the conversations platform.
#[async_trait]
pub trait ConversationPlatform: Send + Sync {
    /// Read the conversation's attributes document.
    ///
    /// A conversation that has never been written to yields an empty
    /// document.
    async fn read_attributes(
        &self,
        conversation: &ConversationRef,
    ) -> Result<AttributeDocument, PlatformError>;

    /// Overwrite the attributes document in full.
    async fn write_attributes(
        &self,
        conversation: &ConversationRef,
        attributes: &AttributeDocument,
    ) -> Result<(), PlatformError>;

    /// Number of channel members.
    async fn participant_count(
        &self,
        conversation: &ConversationRef,
    ) -> Result<usize, PlatformError>;

    /// Post a message into the conversation.
    async fn create_message(
        &self,
        conversation: &ConversationRef,
        message: NewMessage,
    ) -> Result<(), PlatformError>;

    /// List event subscriptions attached to the conversation.
    async fn list_webhooks(
        &self,
        conversation: &ConversationRef,
    ) -> Result<Vec<ConversationWebhook>, PlatformError>;

    /// Remove one subscription by sid.
    async fn remove_webhook(
        &self,
        conversation: &ConversationRef,
        webhook_sid: &str,
    ) -> Result<(), PlatformError>;

    /// Attach a new subscription.
    async fn create_webhook(
        &self,
        conversation: &ConversationRef,
        target: WebhookTarget,
    ) -> Result<(), PlatformError>;
}

/// Message to post into a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMessage {
    /// Plain text body.
    pub body: Option<String>,

    /// Author identity; the platform's system identity when absent.
    pub author: Option<String>,

    /// Content template sid for structured rendering.
    pub content_sid: Option<String>,

    /// JSON-encoded template variables.
    pub content_variables: Option<String>,
}

impl NewMessage {
    /// Plain text message with no explicit author.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }
}

/// Event subscription attached to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWebhook {
    /// Platform-assigned identifier, used for removal.
    pub sid: String,

    pub kind: WebhookKind,
}

/// Configuration for a subscription to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookTarget {
    /// Deliver message-added events to this service's router endpoint.
    AssistantCallback { url: String },

    /// Hand conversation events to the human workflow engine.
    HumanWorkflow { flow_sid: String },
}

impl WebhookTarget {
    pub fn kind(&self) -> WebhookKind {
        match self {
            WebhookTarget::AssistantCallback { .. } => WebhookKind::AssistantCallback,
            WebhookTarget::HumanWorkflow { .. } => WebhookKind::HumanWorkflow,
        }
    }
}

/// Errors from conversation platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError {
    /// Error code for categorization.
    pub code: PlatformErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PlatformError {
    pub fn new(code: PlatformErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::Timeout, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::ApiError, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::DecodeError, message)
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PlatformError {}

impl From<PlatformError> for RelayError {
    fn from(err: PlatformError) -> Self {
        RelayError::new(ErrorCode::PlatformError, err.message)
            .with_detail("platform_code", err.code.to_string())
    }
}

/// Platform error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Bounded request timeout elapsed.
    Timeout,

    /// Platform API rejected the request.
    ApiError,

    /// Response did not match the expected wire shape.
    DecodeError,
}

impl PlatformErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlatformErrorCode::NetworkError | PlatformErrorCode::Timeout
        )
    }
}

impl std::fmt::Display for PlatformErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlatformErrorCode::NetworkError => "network_error",
            PlatformErrorCode::Timeout => "timeout",
            PlatformErrorCode::ApiError => "api_error",
            PlatformErrorCode::DecodeError => "decode_error",
        };
        write!(f, "{}", s)
    }
}
