//! Tool-invocation endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::ToolsAppState;
pub use routes::{tools_router, tools_routes};
