//! Request DTOs for the tool endpoints.
//!
//! The assistant's tool layer posts JSON with camelCase keys; a few fields
//! historically arrived PascalCase, kept as aliases.

use serde::Deserialize;
use serde_json::Value;

/// A send-message tool invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "contentSid")]
    pub content_sid: Option<String>,

    /// Template variables, an object or a pre-encoded JSON string.
    #[serde(rename = "contentVariables")]
    pub content_variables: Option<Value>,

    #[serde(rename = "successMessage", alias = "SuccessMessage")]
    pub success_message: Option<String>,

    #[serde(rename = "_assistantIdentity")]
    pub assistant_identity: Option<String>,
}

/// A handover tool invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandoverRequest {
    #[serde(rename = "flowSid", alias = "FlowSid")]
    pub flow_sid: Option<String>,

    #[serde(rename = "identifiedService", alias = "identified_service")]
    pub identified_service: Option<String>,

    #[serde(rename = "identifiedArea", alias = "identified_area")]
    pub identified_area: Option<String>,

    #[serde(rename = "successMessage", alias = "SuccessMessage")]
    pub success_message: Option<String>,
}

/// Normalize template variables to the JSON string the platform expects.
pub fn encode_content_variables(value: Option<Value>) -> Option<String> {
    value.map(|value| match value {
        Value::String(encoded) => encoded,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_message_request_deserializes() {
        let raw = r#"{"contentSid":"HX1","contentVariables":{"1":"a"},"SuccessMessage":"ok"}"#;
        let request: SendMessageRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.content_sid.as_deref(), Some("HX1"));
        assert_eq!(request.success_message.as_deref(), Some("ok"));
    }

    #[test]
    fn handover_request_accepts_snake_case_aliases() {
        let raw = r#"{"identified_service":"billing","identified_area":"invoices"}"#;
        let request: HandoverRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.identified_service.as_deref(), Some("billing"));
        assert_eq!(request.identified_area.as_deref(), Some("invoices"));
    }

    #[test]
    fn content_variables_object_is_encoded() {
        let encoded = encode_content_variables(Some(json!({"1": "a"})));
        assert_eq!(encoded.as_deref(), Some(r#"{"1":"a"}"#));
    }

    #[test]
    fn content_variables_string_passes_through() {
        let encoded = encode_content_variables(Some(json!(r#"{"1":"a"}"#)));
        assert_eq!(encoded.as_deref(), Some(r#"{"1":"a"}"#));
    }
}
