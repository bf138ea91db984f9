//! Assistant response body variants.
//!
//! The assistant's callback carries the response either as a bare string or
//! as a JSON object `{"body": …, "meta": {"contentSid": …,
//! "contentVariables": …}}`. The shape is decided once here, at the
//! boundary, and consumed uniformly downstream.

use serde::Deserialize;
use serde_json::Value;

/// A reply produced by the assistant, ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    /// Plain conversational text.
    PlainText { body: String },

    /// A content-template reply. Structured content is not renderable by
    /// every client surface, so the plain `body` is always posted as a
    /// second, fallback message.
    Structured {
        body: String,
        content_sid: String,
        content_variables: Option<String>,
    },
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    body: String,
    meta: Option<WireMeta>,
}

#[derive(Deserialize)]
struct WireMeta {
    #[serde(rename = "contentSid")]
    content_sid: Option<String>,
    #[serde(rename = "contentVariables")]
    content_variables: Option<Value>,
}

impl AssistantReply {
    /// Decide the reply shape from the raw callback body.
    ///
    /// A body that parses as the wire object with a `meta.contentSid` is
    /// structured; a parseable object without one contributes only its
    /// `body`; anything else is plain text, verbatim.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<WireReply>(raw) {
            Ok(WireReply {
                body,
                meta:
                    Some(WireMeta {
                        content_sid: Some(content_sid),
                        content_variables,
                    }),
            }) => AssistantReply::Structured {
                body,
                content_sid,
                content_variables: content_variables.map(|value| match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            },
            Ok(WireReply { body, .. }) => AssistantReply::PlainText { body },
            Err(_) => AssistantReply::PlainText {
                body: raw.to_string(),
            },
        }
    }

    pub fn body(&self) -> &str {
        match self {
            AssistantReply::PlainText { body } => body,
            AssistantReply::Structured { body, .. } => body,
        }
    }

    pub fn content_sid(&self) -> Option<&str> {
        match self {
            AssistantReply::PlainText { .. } => None,
            AssistantReply::Structured { content_sid, .. } => Some(content_sid),
        }
    }
}
