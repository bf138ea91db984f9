//! Wire types for the conversations platform REST API.

use serde::Deserialize;

/// A conversation resource as returned by the platform.
#[derive(Debug, Deserialize)]
pub struct ConversationResource {
    /// JSON-encoded attributes document; empty or absent when never written.
    #[serde(default)]
    pub attributes: Option<String>,
}

/// One page of participants.
#[derive(Debug, Deserialize)]
pub struct ParticipantPage {
    #[serde(default)]
    pub participants: Vec<ParticipantResource>,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantResource {
    pub sid: String,
}

/// One page of conversation-scoped webhooks.
#[derive(Debug, Deserialize)]
pub struct WebhookPage {
    #[serde(default)]
    pub webhooks: Vec<WebhookResource>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookResource {
    pub sid: String,
    pub target: String,
}
