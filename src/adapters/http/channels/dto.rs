//! Request/response DTOs for the channel endpoints.
//!
//! The platform delivers webhook events form-encoded with PascalCase field
//! names; the assistant's callback carries its credentials as query
//! parameters and the payload in the form body.

use serde::{Deserialize, Serialize};

/// A message-added webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageAddedEvent {
    #[serde(rename = "ConversationSid")]
    pub conversation_sid: String,

    #[serde(rename = "ChatServiceSid")]
    pub chat_service_sid: String,

    #[serde(rename = "Author")]
    pub author: String,

    #[serde(rename = "Body", default)]
    pub body: String,

    #[serde(rename = "AssistantSid")]
    pub assistant_sid: Option<String>,

    #[serde(rename = "AssistantIdentity")]
    pub assistant_identity: Option<String>,
}

/// Query parameters on the assistant callback URL, placed there when the
/// URL was minted.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseCallbackQuery {
    #[serde(rename = "_token", default)]
    pub token: Option<String>,

    #[serde(rename = "_assistantIdentity")]
    pub assistant_identity: Option<String>,
}

/// Body of the assistant callback.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseCallbackEvent {
    #[serde(rename = "SessionId")]
    pub session_id: String,

    #[serde(rename = "Status", default)]
    pub status: Option<String>,

    #[serde(rename = "Body", default)]
    pub body: Option<String>,
}

/// A send-to-assistant event.
#[derive(Debug, Clone, Deserialize)]
pub struct SendToAssistantEvent {
    #[serde(rename = "ConversationSid")]
    pub conversation_sid: String,

    #[serde(rename = "ChatServiceSid")]
    pub chat_service_sid: String,

    #[serde(rename = "Author")]
    pub author: String,

    #[serde(rename = "Body", default)]
    pub body: String,

    /// Explicit here; this entry point has no configured fallback.
    #[serde(rename = "AssistantSid")]
    pub assistant_sid: String,

    #[serde(rename = "AssistantIdentity")]
    pub assistant_identity: Option<String>,

    /// Opaque, passed through into the attributes untouched.
    #[serde(rename = "InfoUser")]
    pub info_user: Option<String>,
}

/// A clean-attributes event.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanAttributesEvent {
    #[serde(rename = "ConversationSid")]
    pub conversation_sid: String,

    #[serde(rename = "ChatServiceSid")]
    pub chat_service_sid: String,
}

/// Error payload for callback-path failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
