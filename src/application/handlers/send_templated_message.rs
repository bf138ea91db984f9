//! Tool invocation: send a templated message.
//!
//! Callable by the assistant mid-conversation. The caller is the assistant's
//! tool-execution layer, trusted only as far as its `x-session-id` header
//! matches the expected shape; a bad header yields an informational no-op
//! rather than an error.

use std::sync::Arc;

use crate::domain::errors::{ErrorCode, RelayError};
use crate::ports::{ConversationPlatform, NewMessage};

use super::{conversation_from_session_header, ToolReply};

/// Default success string returned to the tool layer.
pub const DEFAULT_SEND_SUCCESS: &str = "Message sent";

/// A send-message tool invocation.
#[derive(Debug, Clone, Default)]
pub struct SendTemplatedMessageCommand {
    /// Raw `x-session-id` header value.
    pub session_header: Option<String>,

    /// Content template to render; required.
    pub content_sid: Option<String>,

    /// JSON-encoded template variables.
    pub content_variables: Option<String>,

    pub assistant_identity: Option<String>,

    /// Caller-supplied success string override.
    pub success_message: Option<String>,
}

pub struct SendTemplatedMessageHandler {
    platform: Arc<dyn ConversationPlatform>,
}

impl SendTemplatedMessageHandler {
    pub fn new(platform: Arc<dyn ConversationPlatform>) -> Self {
        Self { platform }
    }

    pub async fn handle(
        &self,
        cmd: SendTemplatedMessageCommand,
    ) -> Result<ToolReply, RelayError> {
        let conversation = match conversation_from_session_header(cmd.session_header.as_deref()) {
            Ok(conversation) => conversation,
            Err(err) => {
                tracing::error!(error = %err, "send-message tool called without a valid session");
                return Ok(ToolReply::Ignored);
            }
        };

        let Some(content_sid) = cmd.content_sid.filter(|sid| !sid.is_empty()) else {
            return Err(RelayError::new(
                ErrorCode::MissingContentTemplate,
                "unable to send message: content template id is required",
            ));
        };

        self.platform
            .create_message(
                &conversation,
                NewMessage {
                    body: None,
                    author: cmd.assistant_identity.clone(),
                    content_sid: Some(content_sid),
                    content_variables: cmd.content_variables.clone(),
                },
            )
            .await?;

        tracing::info!(conversation = %conversation, "templated message sent");
        Ok(ToolReply::Success(
            cmd.success_message
                .unwrap_or_else(|| DEFAULT_SEND_SUCCESS.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MockPlatform;

    fn command() -> SendTemplatedMessageCommand {
        SendTemplatedMessageCommand {
            session_header: Some("webhook:conversations__IS1/CH1".to_string()),
            content_sid: Some("HX42".to_string()),
            content_variables: Some(r#"{"1":"lunes"}"#.to_string()),
            assistant_identity: None,
            success_message: None,
        }
    }

    #[tokio::test]
    async fn posts_template_and_returns_default_success() {
        let platform = Arc::new(MockPlatform::new());
        let reply = SendTemplatedMessageHandler::new(platform.clone())
            .handle(command())
            .await
            .unwrap();

        assert_eq!(reply, ToolReply::Success(DEFAULT_SEND_SUCCESS.to_string()));
        let messages = platform.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content_sid.as_deref(), Some("HX42"));
        assert_eq!(
            messages[0].content_variables.as_deref(),
            Some(r#"{"1":"lunes"}"#)
        );
    }

    #[tokio::test]
    async fn caller_supplied_success_string_wins() {
        let platform = Arc::new(MockPlatform::new());
        let mut cmd = command();
        cmd.success_message = Some("Listo".to_string());

        let reply = SendTemplatedMessageHandler::new(platform)
            .handle(cmd)
            .await
            .unwrap();
        assert_eq!(reply, ToolReply::Success("Listo".to_string()));
    }

    #[tokio::test]
    async fn bad_session_header_is_an_informational_no_op() {
        let platform = Arc::new(MockPlatform::new());
        let mut cmd = command();
        cmd.session_header = Some("conversations__IS1/CH1".to_string());

        let reply = SendTemplatedMessageHandler::new(platform.clone())
            .handle(cmd)
            .await
            .unwrap();

        assert_eq!(reply, ToolReply::Ignored);
        assert!(platform.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_content_template_is_a_hard_failure() {
        let platform = Arc::new(MockPlatform::new());
        let mut cmd = command();
        cmd.content_sid = None;

        let err = SendTemplatedMessageHandler::new(platform.clone())
            .handle(cmd)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::MissingContentTemplate);
        assert!(platform.messages.lock().unwrap().is_empty());
    }
}
