//! Explicit (re)attach of the assistant to a conversation.
//!
//! The bot-facing direction of the handoff protocol: swap the conversation
//! to a fresh assistant-callback subscription, raise the typing flag, pass
//! through the caller's opaque user context, and dispatch the message to the
//! assistant. Used to (re)start assistant ownership of a channel that a
//! workflow or out-of-band configuration previously held.

use std::sync::Arc;

use crate::application::attributes::AttributeAccessor;
use crate::application::subscriptions::SubscriptionManager;
use crate::domain::attributes::{AttributePatch, ASSISTANT_IS_TYPING, INFO_USER};
use crate::domain::conversation::{routable_identity, ConversationRef};
use crate::domain::errors::RelayError;
use crate::domain::routing::DispatchOutcome;
use crate::ports::{AssistantClient, AssistantDispatch, ConversationPlatform, WebhookTarget};
use crate::security::CallbackSigner;

use super::signed_callback_url;

/// A send-to-assistant event.
#[derive(Debug, Clone)]
pub struct SendToAssistantCommand {
    pub conversation: ConversationRef,
    pub author: String,
    pub body: String,

    /// Assistant to attach; explicit here, no configured fallback.
    pub assistant_sid: String,

    pub assistant_identity: Option<String>,

    /// Opaque caller context merged into the attributes untouched; absent
    /// clears any previous value.
    pub info_user: Option<String>,
}

/// Handler for send-to-assistant events.
pub struct SendToAssistantHandler {
    assistant: Arc<dyn AssistantClient>,
    subscriptions: SubscriptionManager,
    attributes: AttributeAccessor,
    signer: CallbackSigner,
    callback_base_url: String,
}

impl SendToAssistantHandler {
    pub fn new(
        platform: Arc<dyn ConversationPlatform>,
        assistant: Arc<dyn AssistantClient>,
        signer: CallbackSigner,
        callback_base_url: impl Into<String>,
    ) -> Self {
        Self {
            subscriptions: SubscriptionManager::new(platform.clone()),
            attributes: AttributeAccessor::new(platform),
            assistant,
            signer,
            callback_base_url: callback_base_url.into(),
        }
    }

    pub async fn handle(&self, cmd: SendToAssistantCommand) -> Result<DispatchOutcome, RelayError> {
        let identity = routable_identity(&cmd.author);

        let message_added_url = self.message_added_url()?;
        self.subscriptions
            .swap_to(
                &cmd.conversation,
                WebhookTarget::AssistantCallback {
                    url: message_added_url,
                },
            )
            .await?;

        let session_id = cmd.conversation.session_token();
        let webhook = signed_callback_url(
            &self.callback_base_url,
            &self.signer,
            &session_id,
            cmd.assistant_identity.as_deref(),
        )?;

        let patch = match &cmd.info_user {
            Some(info) => AttributePatch::new()
                .set(ASSISTANT_IS_TYPING, true)
                .set(INFO_USER, info.clone()),
            None => AttributePatch::new()
                .set(ASSISTANT_IS_TYPING, true)
                .remove(INFO_USER),
        };
        self.attributes.merge(&cmd.conversation, &patch).await?;

        let request = AssistantDispatch {
            body: cmd.body.clone(),
            identity,
            session_id,
            webhook,
        };

        match self.assistant.send_message(&cmd.assistant_sid, request).await {
            Ok(()) => {
                tracing::info!(
                    conversation = %cmd.conversation,
                    assistant_sid = %cmd.assistant_sid,
                    "conversation attached to assistant"
                );
                Ok(DispatchOutcome::Delivered)
            }
            Err(err) => {
                tracing::error!(
                    conversation = %cmd.conversation,
                    error = %err,
                    "assistant dispatch failed after attach"
                );
                let clear = AttributePatch::new().set(ASSISTANT_IS_TYPING, false);
                if let Err(clear_err) = self.attributes.merge(&cmd.conversation, &clear).await {
                    tracing::warn!(error = %clear_err, "failed to clear typing flag");
                }
                Ok(DispatchOutcome::Degraded {
                    reason: err.to_string(),
                })
            }
        }
    }

    fn message_added_url(&self) -> Result<String, RelayError> {
        reqwest::Url::parse(&self.callback_base_url)
            .and_then(|base| base.join("/channels/conversations/message-added"))
            .map(|url| url.to_string())
            .map_err(|err| {
                RelayError::new(
                    crate::domain::errors::ErrorCode::InternalError,
                    format!("invalid callback base url: {}", err),
                )
            })
    }
}
