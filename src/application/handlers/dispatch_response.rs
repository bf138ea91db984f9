//! Assistant Response Dispatcher.
//!
//! Consumes the assistant's asynchronous callback: verifies the signed
//! token before anything else, resolves the conversation from the echoed
//! session id, clears the typing flag, and posts the reply. Structured
//! content goes out first, always followed by the plain-text body as a
//! fallback message.
//!
//! Once the conversation identity is known, the user must never be left
//! without a response: any failure on the delivery path produces a
//! best-effort apology message before the error is surfaced to the caller.

use std::sync::Arc;

use crate::application::attributes::AttributeAccessor;
use crate::domain::attributes::{AttributePatch, ASSISTANT_IS_TYPING};
use crate::domain::conversation::ConversationRef;
use crate::domain::errors::{ErrorCode, RelayError};
use crate::domain::reply::AssistantReply;
use crate::ports::{ConversationPlatform, NewMessage};
use crate::security::CallbackSigner;

/// A verified-pending assistant callback.
#[derive(Debug, Clone)]
pub struct DispatchResponseCommand {
    /// Signed token from the `_token` query parameter.
    pub token: String,

    /// Echoed session id, `webhook:conversations__<service>/<conversation>`.
    pub session_id: String,

    /// Callback status; `"Failed"` and `"Failure"` denote failure.
    pub status: String,

    /// Raw response body, plain text or the structured wire object.
    pub body: String,

    /// Identity the reply should be authored as, if overridden.
    pub assistant_identity: Option<String>,
}

/// Handler for assistant response callbacks.
pub struct DispatchResponseHandler {
    platform: Arc<dyn ConversationPlatform>,
    attributes: AttributeAccessor,
    signer: CallbackSigner,
    apology_message: String,
}

impl DispatchResponseHandler {
    pub fn new(
        platform: Arc<dyn ConversationPlatform>,
        signer: CallbackSigner,
        apology_message: impl Into<String>,
    ) -> Self {
        Self {
            attributes: AttributeAccessor::new(platform.clone()),
            platform,
            signer,
            apology_message: apology_message.into(),
        }
    }

    pub async fn handle(&self, cmd: DispatchResponseCommand) -> Result<(), RelayError> {
        // Reject forged callbacks before any state is read or mutated. No
        // apology either: the caller is not a verified conversation party.
        let canonical = ConversationRef::canonical_session_id(&cmd.session_id);
        if !self.signer.verify(&cmd.token, canonical) {
            tracing::error!(session_id = %cmd.session_id, "invalid callback token");
            return Err(RelayError::new(
                ErrorCode::InvalidToken,
                "invalid callback token",
            ));
        }

        let conversation = ConversationRef::parse_session_id(&cmd.session_id)?;

        if let Err(err) = self.deliver(&conversation, &cmd).await {
            self.apologize(&conversation, cmd.assistant_identity.clone())
                .await;
            tracing::error!(
                conversation = %conversation,
                error = %err,
                "assistant response dispatch failed"
            );
            return Err(err);
        }
        Ok(())
    }

    async fn deliver(
        &self,
        conversation: &ConversationRef,
        cmd: &DispatchResponseCommand,
    ) -> Result<(), RelayError> {
        if matches!(cmd.status.as_str(), "Failed" | "Failure") {
            self.clear_typing(conversation).await;
            return Err(RelayError::new(
                ErrorCode::AssistantReportedFailure,
                "assistant failed to generate a response",
            ));
        }

        let reply = AssistantReply::parse(&cmd.body);

        self.attributes
            .merge(
                conversation,
                &AttributePatch::new().set(ASSISTANT_IS_TYPING, false),
            )
            .await?;

        let author = cmd.assistant_identity.clone();
        match &reply {
            AssistantReply::Structured {
                body,
                content_sid,
                content_variables,
            } => {
                self.platform
                    .create_message(
                        conversation,
                        NewMessage {
                            body: Some(body.clone()),
                            author: author.clone(),
                            content_sid: Some(content_sid.clone()),
                            content_variables: content_variables.clone(),
                        },
                    )
                    .await?;
                // Not every client surface renders structured content; the
                // plain body always follows as a second message.
                self.platform
                    .create_message(conversation, NewMessage::text(body.clone()).with_author(author))
                    .await?;
            }
            AssistantReply::PlainText { body } => {
                self.platform
                    .create_message(conversation, NewMessage::text(body.clone()).with_author(author))
                    .await?;
            }
        }

        tracing::info!(
            conversation = %conversation,
            structured = reply.content_sid().is_some(),
            "assistant reply posted"
        );
        Ok(())
    }

    /// Best-effort: the typing flag must not stay raised behind an apology.
    async fn clear_typing(&self, conversation: &ConversationRef) {
        let patch = AttributePatch::new().set(ASSISTANT_IS_TYPING, false);
        if let Err(err) = self.attributes.merge(conversation, &patch).await {
            tracing::warn!(
                conversation = %conversation,
                error = %err,
                "failed to clear typing flag"
            );
        }
    }

    async fn apologize(&self, conversation: &ConversationRef, author: Option<String>) {
        let message = NewMessage::text(self.apology_message.clone()).with_author(author);
        if let Err(err) = self.platform.create_message(conversation, message).await {
            tracing::error!(
                conversation = %conversation,
                error = %err,
                "failed to deliver apology message"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MockPlatform;
    use crate::domain::attributes::AttributeDocument;
    use crate::security::DEFAULT_TOKEN_TTL_SECS;
    use serde_json::json;

    const APOLOGY: &str = "algo falló, intentemos otra vez";

    fn signer() -> CallbackSigner {
        CallbackSigner::new("secret", DEFAULT_TOKEN_TTL_SECS)
    }

    fn handler(platform: Arc<MockPlatform>) -> DispatchResponseHandler {
        DispatchResponseHandler::new(platform, signer(), APOLOGY)
    }

    fn command(body: &str, status: &str) -> DispatchResponseCommand {
        let session_id = "webhook:conversations__IS1/CH1".to_string();
        DispatchResponseCommand {
            token: signer().sign("conversations__IS1/CH1"),
            session_id,
            status: status.to_string(),
            body: body.to_string(),
            assistant_identity: None,
        }
    }

    fn typing_attributes() -> AttributeDocument {
        [(ASSISTANT_IS_TYPING.to_string(), json!(true))]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn plain_reply_clears_typing_and_posts_one_message() {
        let platform = Arc::new(MockPlatform::new().with_attributes(typing_attributes()));
        handler(platform.clone())
            .handle(command("aquí está tu respuesta", "Success"))
            .await
            .unwrap();

        assert_eq!(platform.message_bodies(), vec!["aquí está tu respuesta"]);
        let attributes = platform.attributes.lock().unwrap();
        assert_eq!(attributes.get(ASSISTANT_IS_TYPING), Some(&json!(false)));
    }

    #[tokio::test]
    async fn structured_reply_posts_template_then_plain_fallback() {
        let platform = Arc::new(MockPlatform::new());
        let body = r#"{"body":"elige una opción","meta":{"contentSid":"HX42","contentVariables":{"1":"a"}}}"#;
        handler(platform.clone())
            .handle(command(body, "Success"))
            .await
            .unwrap();

        let messages = platform.messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content_sid.as_deref(), Some("HX42"));
        assert_eq!(messages[0].body.as_deref(), Some("elige una opción"));
        assert_eq!(messages[1].content_sid, None);
        assert_eq!(messages[1].body.as_deref(), Some("elige una opción"));
    }

    #[tokio::test]
    async fn failed_status_posts_exactly_one_apology_and_errors() {
        let platform = Arc::new(MockPlatform::new().with_attributes(typing_attributes()));
        let err = handler(platform.clone())
            .handle(command("ignored", "Failed"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AssistantReportedFailure);
        assert_eq!(platform.message_bodies(), vec![APOLOGY]);
        let attributes = platform.attributes.lock().unwrap();
        assert_eq!(attributes.get(ASSISTANT_IS_TYPING), Some(&json!(false)));
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_without_touching_state() {
        let platform = Arc::new(MockPlatform::new().with_attributes(typing_attributes()));
        let mut cmd = command("hola", "Success");
        cmd.token = "1999999999.deadbeef".to_string();

        let err = handler(platform.clone()).handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidToken);
        assert!(platform.messages.lock().unwrap().is_empty());
        assert!(platform.attribute_writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_session_id_is_fatal_without_apology() {
        let platform = Arc::new(MockPlatform::new());
        let session_id = "webhook:conversations__IS1CH1".to_string();
        let cmd = DispatchResponseCommand {
            token: signer().sign("conversations__IS1CH1"),
            session_id,
            status: "Success".to_string(),
            body: "hola".to_string(),
            assistant_identity: None,
        };

        let err = handler(platform.clone()).handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::MalformedSessionId);
        assert!(platform.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn identity_override_authors_the_reply() {
        let platform = Arc::new(MockPlatform::new());
        let mut cmd = command("hola", "Success");
        cmd.assistant_identity = Some("concierge".to_string());

        handler(platform.clone()).handle(cmd).await.unwrap();

        let messages = platform.messages.lock().unwrap();
        assert_eq!(messages[0].author.as_deref(), Some("concierge"));
    }

    #[tokio::test]
    async fn token_signed_without_echo_prefix_still_verifies() {
        // The token is minted over the canonical session id at dispatch
        // time; the callback echoes the prefixed form.
        let platform = Arc::new(MockPlatform::new());
        let cmd = command("hola", "completed");
        assert!(handler(platform).handle(cmd).await.is_ok());
    }
}
