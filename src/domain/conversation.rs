//! Conversation identity and the session-token codec.
//!
//! A conversation is a remote resource owned by the hosting platform,
//! identified by a (service sid, conversation sid) pair. The session token
//! round-tripped through the assistant is the only linkage between an
//! asynchronous callback and its originating conversation, so its encoding
//! is fixed and its parsing is exact: strip the optional echo prefix, strip
//! the namespace, split once on `/`.

use serde::{Deserialize, Serialize};

use super::errors::{ErrorCode, RelayError};

/// Namespace prefix embedded in outbound session tokens.
pub const SESSION_NAMESPACE: &str = "conversations__";

/// Prefix the assistant prepends when echoing the session id back, both in
/// callback bodies and in the `x-session-id` header of tool invocations.
pub const SESSION_ECHO_PREFIX: &str = "webhook:";

/// Full prefix a tool-invocation session header must carry.
pub const SESSION_HEADER_PREFIX: &str = "webhook:conversations__";

/// Reference to a conversation hosted by the external platform.
///
/// This system never creates or deletes conversations; it only reads and
/// incrementally rewrites their shared attribute state and swaps their
/// event subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationRef {
    /// Chat service the conversation belongs to.
    pub service_sid: String,

    /// Conversation sid within the service.
    pub conversation_sid: String,
}

impl ConversationRef {
    pub fn new(service_sid: impl Into<String>, conversation_sid: impl Into<String>) -> Self {
        Self {
            service_sid: service_sid.into(),
            conversation_sid: conversation_sid.into(),
        }
    }

    /// Session token embedded in outbound assistant requests:
    /// `conversations__<serviceSid>/<conversationSid>`.
    pub fn session_token(&self) -> String {
        format!(
            "{}{}/{}",
            SESSION_NAMESPACE, self.service_sid, self.conversation_sid
        )
    }

    /// Canonical form of an echoed session id: the optional `webhook:`
    /// prefix stripped, nothing else. Signed callback tokens are minted and
    /// verified over this form.
    pub fn canonical_session_id(raw: &str) -> &str {
        raw.strip_prefix(SESSION_ECHO_PREFIX).unwrap_or(raw)
    }

    /// Parse a session id echoed by the assistant.
    ///
    /// Accepts both `conversations__S/C` and `webhook:conversations__S/C`.
    /// Anything missing the namespace prefix, the `/` separator, or either
    /// sid segment is malformed and fatal to the callback that carried it.
    pub fn parse_session_id(raw: &str) -> Result<Self, RelayError> {
        let canonical = Self::canonical_session_id(raw);
        let rest = canonical.strip_prefix(SESSION_NAMESPACE).ok_or_else(|| {
            RelayError::new(
                ErrorCode::MalformedSessionId,
                format!("session id missing '{}' prefix", SESSION_NAMESPACE),
            )
        })?;

        let (service_sid, conversation_sid) = rest.split_once('/').ok_or_else(|| {
            RelayError::new(
                ErrorCode::MalformedSessionId,
                "session id missing '/' separator",
            )
        })?;

        if service_sid.is_empty() || conversation_sid.is_empty() {
            return Err(RelayError::new(
                ErrorCode::MalformedSessionId,
                "session id has an empty sid segment",
            ));
        }

        Ok(Self::new(service_sid, conversation_sid))
    }
}

impl std::fmt::Display for ConversationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.service_sid, self.conversation_sid)
    }
}

/// Routable identity of a message author.
///
/// Authors that already carry a namespace separator are used as-is; bare
/// identifiers are qualified as user identities.
pub fn routable_identity(author: &str) -> String {
    if author.contains(':') {
        author.to_string()
    } else {
        format!("user_id:{}", author)
    }
}
