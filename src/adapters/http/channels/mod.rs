//! Conversation-channel endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::ChannelsAppState;
pub use routes::{channels_router, channels_routes};
