//! Ports - trait contracts for external collaborators.
//!
//! The conversations platform, the assistant service, and outbound user
//! notification are reached only through these narrow request/response
//! contracts. All three are assumed eventually consistent, at-least-once
//! delivering, and independently reliable.

mod assistant_client;
mod conversation_platform;
mod user_notifier;

pub use assistant_client::{AssistantClient, AssistantDispatch, AssistantError, AssistantErrorCode};
pub use conversation_platform::{
    ConversationPlatform, ConversationWebhook, NewMessage, PlatformError, PlatformErrorCode,
    WebhookTarget,
};
pub use user_notifier::{NotifyError, UserNotifier};
