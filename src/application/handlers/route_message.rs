//! Inbound Message Router.
//!
//! Triggered once per message-added event. Guards run in order and
//! short-circuit: an attached human-workflow subscription or a second
//! participant means the assistant no longer owns the channel and the event
//! is an idempotent no-op. Otherwise the message is signed, the typing flag
//! is raised, and the body is dispatched to the assistant.
//!
//! The inbound webhook caller is always acknowledged: the message was
//! accepted into the conversation regardless of assistant reachability, so
//! dispatch failures degrade instead of erroring.

use std::sync::Arc;

use crate::application::attributes::AttributeAccessor;
use crate::application::subscriptions::SubscriptionManager;
use crate::domain::attributes::{AttributePatch, ASSISTANT_IS_TYPING};
use crate::domain::conversation::{routable_identity, ConversationRef};
use crate::domain::errors::RelayError;
use crate::domain::routing::{DispatchOutcome, IgnoreReason, RoutingState};
use crate::ports::{AssistantClient, AssistantDispatch, ConversationPlatform};
use crate::security::CallbackSigner;

use super::signed_callback_url;

/// A message-added event to route.
#[derive(Debug, Clone)]
pub struct RouteMessageCommand {
    pub conversation: ConversationRef,
    pub author: String,
    pub body: String,

    /// Per-event assistant override; the configured default otherwise.
    pub assistant_sid: Option<String>,

    /// Identity the assistant should answer as, if overridden.
    pub assistant_identity: Option<String>,
}

/// Handler for inbound message-added events.
pub struct RouteMessageHandler {
    platform: Arc<dyn ConversationPlatform>,
    assistant: Arc<dyn AssistantClient>,
    subscriptions: SubscriptionManager,
    attributes: AttributeAccessor,
    signer: CallbackSigner,
    default_assistant_sid: String,
    callback_base_url: String,
}

impl RouteMessageHandler {
    pub fn new(
        platform: Arc<dyn ConversationPlatform>,
        assistant: Arc<dyn AssistantClient>,
        signer: CallbackSigner,
        default_assistant_sid: impl Into<String>,
        callback_base_url: impl Into<String>,
    ) -> Self {
        Self {
            subscriptions: SubscriptionManager::new(platform.clone()),
            attributes: AttributeAccessor::new(platform.clone()),
            platform,
            assistant,
            signer,
            default_assistant_sid: default_assistant_sid.into(),
            callback_base_url: callback_base_url.into(),
        }
    }

    pub async fn handle(&self, cmd: RouteMessageCommand) -> Result<DispatchOutcome, RelayError> {
        if self.subscriptions.workflow_attached(&cmd.conversation).await? {
            tracing::info!(
                conversation = %cmd.conversation,
                "workflow subscription attached, ignoring message"
            );
            return Ok(DispatchOutcome::Ignored(IgnoreReason::AlreadyEscalated));
        }

        let participants = self.platform.participant_count(&cmd.conversation).await?;
        let state = RoutingState::derive(false, participants);
        if !state.routes_to_assistant() {
            tracing::info!(
                conversation = %cmd.conversation,
                participants,
                "human participant present, ignoring message"
            );
            return Ok(DispatchOutcome::Ignored(IgnoreReason::HumanPresent));
        }

        let identity = routable_identity(&cmd.author);
        let session_id = cmd.conversation.session_token();
        let webhook = signed_callback_url(
            &self.callback_base_url,
            &self.signer,
            &session_id,
            cmd.assistant_identity.as_deref(),
        )?;

        let assistant_sid = cmd
            .assistant_sid
            .as_deref()
            .unwrap_or(&self.default_assistant_sid);
        let request = AssistantDispatch {
            body: cmd.body.clone(),
            identity,
            session_id,
            webhook,
        };

        self.attributes
            .merge(
                &cmd.conversation,
                &AttributePatch::new().set(ASSISTANT_IS_TYPING, true),
            )
            .await?;

        match self.assistant.send_message(assistant_sid, request).await {
            Ok(()) => {
                tracing::info!(conversation = %cmd.conversation, assistant_sid, "message dispatched");
                Ok(DispatchOutcome::Delivered)
            }
            Err(err) => {
                tracing::error!(
                    conversation = %cmd.conversation,
                    error = %err,
                    "assistant dispatch failed"
                );
                self.clear_typing(&cmd.conversation).await;
                Ok(DispatchOutcome::Degraded {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// A failed dispatch must not leave the conversation stuck in typing.
    async fn clear_typing(&self, conversation: &ConversationRef) {
        let patch = AttributePatch::new().set(ASSISTANT_IS_TYPING, false);
        if let Err(err) = self.attributes.merge(conversation, &patch).await {
            tracing::warn!(
                conversation = %conversation,
                error = %err,
                "failed to clear typing flag after dispatch failure"
            );
        }
    }
}
