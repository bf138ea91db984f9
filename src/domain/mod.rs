//! Domain layer containing the relay's core types.
//!
//! # Module Organization
//!
//! - `conversation` - Conversation identity and session-token codec
//! - `attributes` - Shared attributes document and merge policy
//! - `routing` - Channel ownership model and routing outcomes
//! - `reply` - Assistant response body variants
//! - `errors` - Relay error taxonomy

pub mod attributes;
pub mod conversation;
pub mod errors;
pub mod reply;
pub mod routing;

pub use attributes::{AttributeDocument, AttributePatch};
pub use conversation::ConversationRef;
pub use errors::{ErrorCode, RelayError};
pub use reply::AssistantReply;
pub use routing::{DispatchOutcome, IgnoreReason, RoutingState, WebhookKind};
