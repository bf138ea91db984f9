//! Outbound user notification port.
//!
//! Used when a handover is blocked by missing or unrecognized classification:
//! the user gets a direct notification describing the failure instead of a
//! silently dropped transfer.

use async_trait::async_trait;

use crate::domain::conversation::ConversationRef;
use crate::domain::errors::{ErrorCode, RelayError};

/// Port for direct user notification.
#[async_trait]
pub trait UserNotifier: Send + Sync {
    /// Deliver `body` to the user of `conversation`.
    async fn notify(&self, conversation: &ConversationRef, body: &str) -> Result<(), NotifyError>;
}

/// Error from notification delivery.
#[derive(Debug, Clone)]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl std::error::Error for NotifyError {}

impl From<NotifyError> for RelayError {
    fn from(err: NotifyError) -> Self {
        RelayError::new(ErrorCode::NotificationError, err.message)
    }
}
