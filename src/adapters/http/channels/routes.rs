//! Axum router configuration for the channel endpoints.

use axum::{routing::post, Router};

use super::handlers::{
    assistant_response, clean_attributes, message_added, send_to_assistant, ChannelsAppState,
};

/// Create the channel routes.
///
/// # Routes
///
/// - `POST /message-added` - platform message-added webhook (always 200)
/// - `POST /response` - assistant callback (signature-verified)
/// - `POST /send-to-assistant` - explicit assistant (re)attach (always 200)
/// - `POST /clean-attributes` - routing-state cleanup (always 200)
pub fn channels_routes() -> Router<ChannelsAppState> {
    Router::new()
        .route("/message-added", post(message_added))
        .route("/response", post(assistant_response))
        .route("/send-to-assistant", post(send_to_assistant))
        .route("/clean-attributes", post(clean_attributes))
}

/// Create the channel router mounted at its public path.
pub fn channels_router() -> Router<ChannelsAppState> {
    Router::new().nest("/channels/conversations", channels_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::handlers::{
        CleanAttributesHandler, DispatchResponseHandler, RouteMessageHandler,
        SendToAssistantHandler,
    };
    use crate::application::testing::{MockAssistant, MockPlatform};
    use crate::security::{CallbackSigner, DEFAULT_TOKEN_TTL_SECS};

    fn test_state() -> ChannelsAppState {
        let platform = Arc::new(MockPlatform::new());
        let assistant = Arc::new(MockAssistant::new());
        let signer = CallbackSigner::new("secret", DEFAULT_TOKEN_TTL_SECS);

        ChannelsAppState {
            route_message: Arc::new(RouteMessageHandler::new(
                platform.clone(),
                assistant.clone(),
                signer.clone(),
                "AI_default",
                "https://relay.example.com",
            )),
            dispatch_response: Arc::new(DispatchResponseHandler::new(
                platform.clone(),
                signer.clone(),
                "lo sentimos",
            )),
            send_to_assistant: Arc::new(SendToAssistantHandler::new(
                platform.clone(),
                assistant,
                signer,
                "https://relay.example.com",
            )),
            clean_attributes: Arc::new(CleanAttributesHandler::new(platform)),
        }
    }

    #[test]
    fn channels_router_builds() {
        let router = channels_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
