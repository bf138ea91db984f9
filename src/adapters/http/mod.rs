//! HTTP adapters - the per-route entry shims.
//!
//! Two route groups share the service: `channels` receives the platform's
//! form-encoded conversation webhooks and the assistant's callback, `tools`
//! receives the assistant's JSON tool invocations.

pub mod channels;
pub mod tools;

pub use channels::{channels_router, ChannelsAppState};
pub use tools::{tools_router, ToolsAppState};
