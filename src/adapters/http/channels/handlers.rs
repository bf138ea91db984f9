//! HTTP handlers for the channel endpoints.
//!
//! The platform's webhook contract is: always acknowledge. Routing and
//! cleanup problems are logged and answered with an empty 200 (a later
//! event re-reads current state); only the assistant-callback path surfaces
//! its failures as explicit HTTP errors.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::handlers::{
    CleanAttributesHandler, DispatchResponseCommand, DispatchResponseHandler,
    RouteMessageCommand, RouteMessageHandler, SendToAssistantCommand, SendToAssistantHandler,
};
use crate::domain::conversation::ConversationRef;
use crate::domain::errors::RelayError;

use super::dto::{
    CleanAttributesEvent, ErrorResponse, MessageAddedEvent, ResponseCallbackEvent,
    ResponseCallbackQuery, SendToAssistantEvent,
};

/// Shared state for the channel endpoints.
#[derive(Clone)]
pub struct ChannelsAppState {
    pub route_message: Arc<RouteMessageHandler>,
    pub dispatch_response: Arc<DispatchResponseHandler>,
    pub send_to_assistant: Arc<SendToAssistantHandler>,
    pub clean_attributes: Arc<CleanAttributesHandler>,
}

/// Empty text/plain acknowledgment the platform expects.
fn acknowledge() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        "",
    )
        .into_response()
}

/// POST /channels/conversations/message-added
pub async fn message_added(
    State(state): State<ChannelsAppState>,
    Form(event): Form<MessageAddedEvent>,
) -> Response {
    let cmd = RouteMessageCommand {
        conversation: ConversationRef::new(event.chat_service_sid, event.conversation_sid),
        author: event.author,
        body: event.body,
        assistant_sid: event.assistant_sid,
        assistant_identity: event.assistant_identity,
    };

    if let Err(err) = state.route_message.handle(cmd).await {
        tracing::error!(error = %err, "message routing failed");
    }
    acknowledge()
}

/// POST /channels/conversations/response
pub async fn assistant_response(
    State(state): State<ChannelsAppState>,
    Query(query): Query<ResponseCallbackQuery>,
    Form(event): Form<ResponseCallbackEvent>,
) -> Response {
    let cmd = DispatchResponseCommand {
        token: query.token.unwrap_or_default(),
        session_id: event.session_id,
        status: event.status.unwrap_or_default(),
        body: event.body.unwrap_or_default(),
        assistant_identity: query.assistant_identity,
    };

    match state.dispatch_response.handle(cmd).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
        Err(err) => callback_error(err),
    }
}

/// POST /channels/conversations/send-to-assistant
pub async fn send_to_assistant(
    State(state): State<ChannelsAppState>,
    Form(event): Form<SendToAssistantEvent>,
) -> Response {
    let cmd = SendToAssistantCommand {
        conversation: ConversationRef::new(event.chat_service_sid, event.conversation_sid),
        author: event.author,
        body: event.body,
        assistant_sid: event.assistant_sid,
        assistant_identity: event.assistant_identity,
        info_user: event.info_user,
    };

    if let Err(err) = state.send_to_assistant.handle(cmd).await {
        tracing::error!(error = %err, "send-to-assistant failed");
    }
    acknowledge()
}

/// POST /channels/conversations/clean-attributes
pub async fn clean_attributes(
    State(state): State<ChannelsAppState>,
    Form(event): Form<CleanAttributesEvent>,
) -> Response {
    let conversation = ConversationRef::new(event.chat_service_sid, event.conversation_sid);
    if let Err(err) = state.clean_attributes.handle(&conversation).await {
        tracing::error!(error = %err, "attribute cleanup failed");
    }
    acknowledge()
}

/// Map a callback-path failure to its HTTP shape.
fn callback_error(err: RelayError) -> Response {
    let status = if err.code.is_authentication() {
        StatusCode::UNAUTHORIZED
    } else if err.code.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        Json(ErrorResponse::new(err.code.to_string(), err.message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{ErrorCode, RelayError};

    #[test]
    fn authentication_failures_map_to_401() {
        let response = callback_error(RelayError::new(ErrorCode::InvalidToken, "bad token"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_failures_map_to_422() {
        let response = callback_error(RelayError::new(
            ErrorCode::MalformedSessionId,
            "missing separator",
        ));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_failures_map_to_502() {
        let response = callback_error(RelayError::new(
            ErrorCode::AssistantReportedFailure,
            "assistant failed",
        ));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
