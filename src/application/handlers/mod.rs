//! Application handlers - one per inbound event or tool invocation.
//!
//! Each handler is an independent, stateless invocation: all cross-call
//! state lives in the platform's attributes document and subscription list.

mod clean_attributes;
mod dispatch_response;
mod handover;
mod route_message;
mod send_templated_message;
mod send_to_assistant;

pub use clean_attributes::CleanAttributesHandler;
pub use dispatch_response::{DispatchResponseCommand, DispatchResponseHandler};
pub use handover::{HandoverCommand, HandoverConfig, HandoverHandler, DEFAULT_HANDOVER_SUCCESS};
pub use route_message::{RouteMessageCommand, RouteMessageHandler};
pub use send_templated_message::{
    SendTemplatedMessageCommand, SendTemplatedMessageHandler, DEFAULT_SEND_SUCCESS,
};
pub use send_to_assistant::{SendToAssistantCommand, SendToAssistantHandler};

use crate::domain::conversation::{ConversationRef, SESSION_HEADER_PREFIX};
use crate::domain::errors::{ErrorCode, RelayError};
use crate::security::CallbackSigner;

/// Fixed informational reply for requests whose session header fails the
/// precondition. The assistant's tool layer treats it as a no-op result.
pub const IGNORED_TOOL_OUTPUT: &str = "Unable to perform action. Ignore this output";

/// Outcome of a tool invocation, surfaced back to the assistant's tool
/// layer as a short string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolReply {
    /// Action performed; carries the success string to return.
    Success(String),

    /// Session header absent or malformed. Non-fatal: the caller receives
    /// [`IGNORED_TOOL_OUTPUT`] and nothing was touched.
    Ignored,
}

/// Resolve a tool invocation's `x-session-id` header into a conversation.
///
/// The header is a different trust boundary than the signed callback token:
/// the caller is the assistant's tool-execution layer, validated only by the
/// fixed prefix and session-id shape.
pub(crate) fn conversation_from_session_header(
    header: Option<&str>,
) -> Result<ConversationRef, RelayError> {
    let value = header.ok_or_else(|| {
        RelayError::new(ErrorCode::InvalidSessionHeader, "missing x-session-id header")
    })?;
    if !value.starts_with(SESSION_HEADER_PREFIX) {
        return Err(RelayError::new(
            ErrorCode::InvalidSessionHeader,
            format!("session header missing '{}' prefix", SESSION_HEADER_PREFIX),
        ));
    }
    ConversationRef::parse_session_id(value)
        .map_err(|err| RelayError::new(ErrorCode::InvalidSessionHeader, err.message))
}

/// Build the signed callback URL handed to the assistant.
///
/// The token rides as a query parameter because the assistant round-trips
/// the URL verbatim; the optional identity override travels the same way.
pub(crate) fn signed_callback_url(
    callback_base_url: &str,
    signer: &CallbackSigner,
    session_id: &str,
    assistant_identity: Option<&str>,
) -> Result<String, RelayError> {
    let mut url = reqwest::Url::parse(callback_base_url)
        .and_then(|base| base.join("/channels/conversations/response"))
        .map_err(|err| {
            RelayError::new(
                ErrorCode::InternalError,
                format!("invalid callback base url: {}", err),
            )
        })?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("_token", &signer.sign(session_id));
        if let Some(identity) = assistant_identity {
            pairs.append_pair("_assistantIdentity", identity);
        }
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::DEFAULT_TOKEN_TTL_SECS;

    #[test]
    fn session_header_requires_prefix() {
        let err = conversation_from_session_header(Some("conversations__S/C")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSessionHeader);

        let err = conversation_from_session_header(None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSessionHeader);
    }

    #[test]
    fn session_header_resolves_conversation() {
        let conversation =
            conversation_from_session_header(Some("webhook:conversations__IS1/CH1")).unwrap();
        assert_eq!(conversation, ConversationRef::new("IS1", "CH1"));
    }

    #[test]
    fn callback_url_carries_token_and_identity() {
        let signer = CallbackSigner::new("secret", DEFAULT_TOKEN_TTL_SECS);
        let url = signed_callback_url(
            "https://relay.example.com",
            &signer,
            "conversations__IS1/CH1",
            Some("concierge"),
        )
        .unwrap();

        assert!(url.starts_with("https://relay.example.com/channels/conversations/response?"));
        assert!(url.contains("_token="));
        assert!(url.contains("_assistantIdentity=concierge"));
    }

    #[test]
    fn callback_url_token_verifies() {
        let signer = CallbackSigner::new("secret", DEFAULT_TOKEN_TTL_SECS);
        let url = signed_callback_url(
            "https://relay.example.com",
            &signer,
            "conversations__IS1/CH1",
            None,
        )
        .unwrap();

        let parsed = reqwest::Url::parse(&url).unwrap();
        let token = parsed
            .query_pairs()
            .find(|(k, _)| k == "_token")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(signer.verify(&token, "conversations__IS1/CH1"));
    }
}
