//! HTTP handlers for the tool endpoints.
//!
//! Tool invocations answer the assistant's tool-execution layer, which
//! consumes short strings, not structured errors: header precondition
//! failures and upstream problems degrade to a soft 200, while missing or
//! unrecognized arguments surface as 422 so a misconfigured assistant is
//! visible.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::handlers::{
    HandoverCommand, HandoverHandler, SendTemplatedMessageCommand, SendTemplatedMessageHandler,
    ToolReply, IGNORED_TOOL_OUTPUT,
};
use crate::domain::errors::RelayError;

use super::dto::{encode_content_variables, HandoverRequest, SendMessageRequest};

/// Header carrying the assistant's session identity.
const SESSION_ID_HEADER: &str = "x-session-id";

/// Shared state for the tool endpoints.
#[derive(Clone)]
pub struct ToolsAppState {
    pub send_templated_message: Arc<SendTemplatedMessageHandler>,
    pub handover: Arc<HandoverHandler>,
}

fn session_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// POST /tools/send-message
pub async fn send_message(
    State(state): State<ToolsAppState>,
    headers: HeaderMap,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    let cmd = SendTemplatedMessageCommand {
        session_header: session_header(&headers),
        content_sid: request.content_sid,
        content_variables: encode_content_variables(request.content_variables),
        assistant_identity: request.assistant_identity,
        success_message: request.success_message,
    };

    tool_response(state.send_templated_message.handle(cmd).await, "")
}

/// POST /tools/handover
pub async fn handover(
    State(state): State<ToolsAppState>,
    headers: HeaderMap,
    Json(request): Json<HandoverRequest>,
) -> Response {
    let cmd = HandoverCommand {
        session_header: session_header(&headers),
        flow_sid: request.flow_sid,
        identified_service: request.identified_service,
        identified_area: request.identified_area,
        success_message: request.success_message,
    };

    tool_response(state.handover.handle(cmd).await, "Could not handover")
}

/// Map a tool outcome to the short-string contract.
fn tool_response(result: Result<ToolReply, RelayError>, soft_failure: &str) -> Response {
    match result {
        Ok(ToolReply::Success(message)) => (StatusCode::OK, message).into_response(),
        Ok(ToolReply::Ignored) => (StatusCode::OK, IGNORED_TOOL_OUTPUT).into_response(),
        Err(err) if err.code.is_validation() => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.message).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "tool invocation failed");
            (StatusCode::OK, soft_failure.to_string()).into_response()
        }
    }
}
