//! Axum router configuration for the tool endpoints.

use axum::{routing::post, Router};

use super::handlers::{handover, send_message, ToolsAppState};

/// Create the tool routes.
///
/// # Routes
///
/// - `POST /send-message` - post a templated message as the assistant
/// - `POST /handover` - transfer the conversation to a human workflow
///
/// Both are gated on the `x-session-id` header, not the callback token.
pub fn tools_routes() -> Router<ToolsAppState> {
    Router::new()
        .route("/send-message", post(send_message))
        .route("/handover", post(handover))
}

/// Create the tool router mounted at its public path.
pub fn tools_router() -> Router<ToolsAppState> {
    Router::new().nest("/tools", tools_routes())
}
