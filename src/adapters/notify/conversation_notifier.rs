//! Notifier that delivers through the conversation channel itself.
//!
//! Posts the notification as a message authored by the configured sender
//! identity, so the user sees it in the same thread where the blocked
//! action happened.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::conversation::ConversationRef;
use crate::ports::{ConversationPlatform, NewMessage, NotifyError, UserNotifier};

pub struct ConversationNotifier {
    platform: Arc<dyn ConversationPlatform>,
    sender_identity: String,
}

impl ConversationNotifier {
    pub fn new(platform: Arc<dyn ConversationPlatform>, sender_identity: impl Into<String>) -> Self {
        Self {
            platform,
            sender_identity: sender_identity.into(),
        }
    }
}

#[async_trait]
impl UserNotifier for ConversationNotifier {
    async fn notify(&self, conversation: &ConversationRef, body: &str) -> Result<(), NotifyError> {
        self.platform
            .create_message(
                conversation,
                NewMessage::text(body).with_author(Some(self.sender_identity.clone())),
            )
            .await
            .map_err(|err| NotifyError::new(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MockPlatform;

    #[tokio::test]
    async fn notification_is_authored_by_the_configured_sender() {
        let platform = Arc::new(MockPlatform::new());
        let notifier = ConversationNotifier::new(platform.clone(), "relay-notices");

        notifier
            .notify(&ConversationRef::new("IS1", "CH1"), "no pudimos transferirte")
            .await
            .unwrap();

        let messages = platform.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].author.as_deref(), Some("relay-notices"));
        assert_eq!(messages[0].body.as_deref(), Some("no pudimos transferirte"));
    }
}
