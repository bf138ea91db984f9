//! Error types for the relay core.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by the relay's failure taxonomy.
///
/// Authentication failures are fatal to the request with nothing mutated and
/// no user-facing message. Validation failures are fatal to the action but
/// conversation-visible where the user context is recoverable. Upstream
/// failures are logged and, mid-conversation, answered with an apology so
/// the channel never goes silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication failures
    InvalidToken,
    InvalidSessionHeader,

    // Validation failures
    MalformedSessionId,
    MissingContentTemplate,
    MissingWorkflow,
    MissingClassification,
    UnknownClassification,

    // Upstream failures
    PlatformError,
    AssistantError,
    AssistantReportedFailure,
    NotificationError,

    // Everything else
    InternalError,
}

impl ErrorCode {
    /// Fatal, nothing mutated, no apology: the caller is not a verified
    /// conversation party.
    pub fn is_authentication(&self) -> bool {
        matches!(self, ErrorCode::InvalidToken | ErrorCode::InvalidSessionHeader)
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorCode::MalformedSessionId
                | ErrorCode::MissingContentTemplate
                | ErrorCode::MissingWorkflow
                | ErrorCode::MissingClassification
                | ErrorCode::UnknownClassification
        )
    }

    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ErrorCode::PlatformError
                | ErrorCode::AssistantError
                | ErrorCode::AssistantReportedFailure
                | ErrorCode::NotificationError
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidSessionHeader => "INVALID_SESSION_HEADER",
            ErrorCode::MalformedSessionId => "MALFORMED_SESSION_ID",
            ErrorCode::MissingContentTemplate => "MISSING_CONTENT_TEMPLATE",
            ErrorCode::MissingWorkflow => "MISSING_WORKFLOW",
            ErrorCode::MissingClassification => "MISSING_CLASSIFICATION",
            ErrorCode::UnknownClassification => "UNKNOWN_CLASSIFICATION",
            ErrorCode::PlatformError => "PLATFORM_ERROR",
            ErrorCode::AssistantError => "ASSISTANT_ERROR",
            ErrorCode::AssistantReportedFailure => "ASSISTANT_REPORTED_FAILURE",
            ErrorCode::NotificationError => "NOTIFICATION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard relay error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct RelayError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl RelayError {
    /// Creates a new relay error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for RelayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = RelayError::new(ErrorCode::InvalidToken, "invalid callback token");
        assert_eq!(format!("{}", err), "[INVALID_TOKEN] invalid callback token");
    }

    #[test]
    fn with_detail_accumulates() {
        let err = RelayError::new(ErrorCode::MissingClassification, "service required")
            .with_detail("field", "identifiedService");
        assert_eq!(
            err.details.get("field"),
            Some(&"identifiedService".to_string())
        );
    }

    #[test]
    fn taxonomy_predicates_partition_codes() {
        assert!(ErrorCode::InvalidToken.is_authentication());
        assert!(!ErrorCode::InvalidToken.is_validation());

        assert!(ErrorCode::UnknownClassification.is_validation());
        assert!(!ErrorCode::UnknownClassification.is_upstream());

        assert!(ErrorCode::AssistantReportedFailure.is_upstream());
        assert!(!ErrorCode::AssistantReportedFailure.is_authentication());
    }
}
