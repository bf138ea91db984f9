//! Webhook Subscription Manager.
//!
//! Upholds the single-active-subscriber invariant: at most one
//! `assistant-callback` or `human-workflow` subscription per conversation.
//! The store offers no compare-and-swap, so every transition follows the
//! remove-then-create protocol: list, remove everything concurrently, then
//! create exactly one subscription of the target kind. A brief window with
//! no subscription is accepted (messages arriving then are dropped, not
//! corrupted); double delivery to a stale target is not.

use std::sync::Arc;

use futures::future::join_all;

use crate::domain::conversation::ConversationRef;
use crate::domain::routing::WebhookKind;
use crate::ports::{ConversationPlatform, PlatformError, WebhookTarget};

#[derive(Clone)]
pub struct SubscriptionManager {
    platform: Arc<dyn ConversationPlatform>,
}

impl SubscriptionManager {
    pub fn new(platform: Arc<dyn ConversationPlatform>) -> Self {
        Self { platform }
    }

    /// Whether a human-workflow subscription currently owns the
    /// conversation.
    pub async fn workflow_attached(
        &self,
        conversation: &ConversationRef,
    ) -> Result<bool, PlatformError> {
        let webhooks = self.platform.list_webhooks(conversation).await?;
        Ok(webhooks
            .iter()
            .any(|webhook| webhook.kind == WebhookKind::HumanWorkflow))
    }

    /// Remove every subscription, fanned out concurrently.
    ///
    /// Partial failures are logged and never rolled back: a stale duplicate
    /// subscription is lower-risk than a missing one, so the caller proceeds
    /// to create regardless.
    pub async fn remove_all(&self, conversation: &ConversationRef) -> Result<(), PlatformError> {
        let webhooks = self.platform.list_webhooks(conversation).await?;
        let removals: Vec<_> = webhooks
            .iter()
            .map(|webhook| self.platform.remove_webhook(conversation, &webhook.sid))
            .collect();

        for (webhook, result) in webhooks.iter().zip(join_all(removals).await) {
            if let Err(err) = result {
                tracing::warn!(
                    webhook_sid = %webhook.sid,
                    target = webhook.kind.target(),
                    error = %err,
                    "failed to remove subscription, proceeding"
                );
            }
        }
        Ok(())
    }

    /// Swap the conversation to a single subscription of the target kind.
    pub async fn swap_to(
        &self,
        conversation: &ConversationRef,
        target: WebhookTarget,
    ) -> Result<(), PlatformError> {
        self.remove_all(conversation).await?;
        self.platform.create_webhook(conversation, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MockPlatform;
    use crate::ports::ConversationWebhook;

    fn conversation() -> ConversationRef {
        ConversationRef::new("IS1", "CH1")
    }

    fn webhook(sid: &str, target: &str) -> ConversationWebhook {
        ConversationWebhook {
            sid: sid.to_string(),
            kind: WebhookKind::from_target(target),
        }
    }

    #[tokio::test]
    async fn swap_leaves_exactly_one_subscription_of_target_kind() {
        let priors: Vec<Vec<ConversationWebhook>> = vec![
            vec![],
            vec![webhook("WH1", "assistant-callback")],
            vec![
                webhook("WH1", "assistant-callback"),
                webhook("WH2", "human-workflow"),
                webhook("WH3", "studio"),
            ],
        ];

        for prior in priors {
            let platform = Arc::new(MockPlatform::new().with_webhooks(prior));
            let manager = SubscriptionManager::new(platform.clone());

            manager
                .swap_to(
                    &conversation(),
                    WebhookTarget::HumanWorkflow {
                        flow_sid: "FW1".to_string(),
                    },
                )
                .await
                .unwrap();

            let remaining = platform.list_webhooks(&conversation()).await.unwrap();
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].kind, WebhookKind::HumanWorkflow);
        }
    }

    #[tokio::test]
    async fn workflow_attached_detects_only_workflow_kind() {
        let platform = Arc::new(
            MockPlatform::new().with_webhooks(vec![webhook("WH1", "assistant-callback")]),
        );
        let manager = SubscriptionManager::new(platform.clone());
        assert!(!manager.workflow_attached(&conversation()).await.unwrap());

        let platform =
            Arc::new(MockPlatform::new().with_webhooks(vec![webhook("WH2", "human-workflow")]));
        let manager = SubscriptionManager::new(platform);
        assert!(manager.workflow_attached(&conversation()).await.unwrap());
    }

    #[tokio::test]
    async fn removal_failures_do_not_block_the_swap() {
        let platform = Arc::new(
            MockPlatform::new()
                .with_webhooks(vec![webhook("WH1", "studio"), webhook("WH2", "studio")])
                .failing_removals(),
        );
        let manager = SubscriptionManager::new(platform.clone());

        manager
            .swap_to(
                &conversation(),
                WebhookTarget::AssistantCallback {
                    url: "https://relay.example.com/channels/conversations/message-added"
                        .to_string(),
                },
            )
            .await
            .unwrap();

        // The stale entries survive (removals failed) but the new target was
        // still created.
        let remaining = platform.list_webhooks(&conversation()).await.unwrap();
        assert_eq!(remaining.len(), 3);
        assert!(remaining
            .iter()
            .any(|w| w.kind == WebhookKind::AssistantCallback));
    }
}
