//! Assistant service port.
//!
//! Outbound contract for handing a conversation message to the AI assistant.
//! The assistant answers asynchronously through the signed callback URL
//! carried in the request, never on this call's response.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::{ErrorCode, RelayError};

/// Request dispatched to the assistant for a response.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantDispatch {
    /// The user's message text.
    pub body: String,

    /// Routable identity of the author.
    pub identity: String,

    /// Session token correlating the asynchronous callback, shape
    /// `conversations__<serviceSid>/<conversationSid>`.
    pub session_id: String,

    /// Callback URL carrying the signed token (and optional identity
    /// override) as query parameters.
    pub webhook: String,
}

/// Port for the assistant service.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Send a conversation message to the assistant identified by
    /// `assistant_sid`.
    async fn send_message(
        &self,
        assistant_sid: &str,
        request: AssistantDispatch,
    ) -> Result<(), AssistantError>;
}

/// Errors from assistant dispatch.
#[derive(Debug, Clone)]
pub struct AssistantError {
    pub code: AssistantErrorCode,
    pub message: String,
}

impl AssistantError {
    pub fn new(code: AssistantErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorCode::Timeout, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorCode::ApiError, message)
    }
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for AssistantError {}

impl From<AssistantError> for RelayError {
    fn from(err: AssistantError) -> Self {
        RelayError::new(ErrorCode::AssistantError, err.message)
            .with_detail("assistant_code", err.code.to_string())
    }
}

/// Assistant error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantErrorCode {
    NetworkError,

    /// Bounded request timeout elapsed; treated as a dispatch failure, never
    /// as conversation-state corruption.
    Timeout,

    ApiError,
}

impl std::fmt::Display for AssistantErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssistantErrorCode::NetworkError => "network_error",
            AssistantErrorCode::Timeout => "timeout",
            AssistantErrorCode::ApiError => "api_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn AssistantClient) {}
    }

    #[test]
    fn converts_to_relay_error() {
        let err: RelayError = AssistantError::timeout("assistant unreachable").into();
        assert_eq!(err.code, ErrorCode::AssistantError);
        assert!(err.message.contains("unreachable"));
    }
}
