//! Channel ownership model.
//!
//! Which consumer owns a conversation's messages is encoded remotely by the
//! kind of event subscription attached and by whether a human participant
//! has joined. That state is derived once per event into [`RoutingState`]
//! instead of being re-interpreted ad hoc at each decision point.

use serde::{Deserialize, Serialize};

/// Wire name of the subscription targeting this service's router endpoint.
pub const TARGET_ASSISTANT_CALLBACK: &str = "assistant-callback";

/// Wire name of the subscription targeting the human workflow engine.
pub const TARGET_HUMAN_WORKFLOW: &str = "human-workflow";

/// Kind of event subscription attached to a conversation.
///
/// At most one subscription of kind `AssistantCallback` or `HumanWorkflow`
/// should be active per conversation at a time; the two are mutually
/// exclusive. The store offers no compare-and-swap, so the invariant is
/// upheld by the remove-then-create swap protocol, not atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookKind {
    /// Delivers message-added events to this service's router.
    AssistantCallback,

    /// Delivers conversation events to the human workflow engine.
    HumanWorkflow,

    /// Attached out-of-band; listed and removed during swaps, never created
    /// here.
    Other(String),
}

impl WebhookKind {
    pub fn from_target(target: &str) -> Self {
        match target {
            TARGET_ASSISTANT_CALLBACK => WebhookKind::AssistantCallback,
            TARGET_HUMAN_WORKFLOW => WebhookKind::HumanWorkflow,
            other => WebhookKind::Other(other.to_string()),
        }
    }

    pub fn target(&self) -> &str {
        match self {
            WebhookKind::AssistantCallback => TARGET_ASSISTANT_CALLBACK,
            WebhookKind::HumanWorkflow => TARGET_HUMAN_WORKFLOW,
            WebhookKind::Other(target) => target,
        }
    }
}

/// Who currently owns message routing for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingState {
    /// The assistant owns the channel; new messages are routed to it.
    BotActive,

    /// A human participant has joined but no workflow subscription exists
    /// yet; routing is suspended until the handover completes.
    Escalating,

    /// A human workflow subscription owns the channel.
    HumanActive,
}

impl RoutingState {
    /// Derive ownership from the subscription set and the participant count.
    pub fn derive(workflow_attached: bool, participants: usize) -> Self {
        if workflow_attached {
            RoutingState::HumanActive
        } else if participants > 1 {
            RoutingState::Escalating
        } else {
            RoutingState::BotActive
        }
    }

    pub fn routes_to_assistant(&self) -> bool {
        matches!(self, RoutingState::BotActive)
    }
}

/// Internal outcome of an inbound routing attempt.
///
/// The inbound webhook caller is always acknowledged; this records what
/// actually happened so observability can distinguish "delivered" from
/// "failed, but the caller path did not allow raising it".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Message handed to the assistant.
    Delivered,

    /// Assistant dispatch failed; the inbound event was still acknowledged.
    Degraded { reason: String },

    /// A guard short-circuited; nothing dispatched, nothing mutated.
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A human-workflow subscription already owns the conversation.
    AlreadyEscalated,

    /// More than one participant; a human is already present.
    HumanPresent,
}
