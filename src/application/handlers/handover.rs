//! Tool invocation: hand the conversation over to a human workflow.
//!
//! The assistant must have classified the conversation into a known service
//! and area before the transfer; classification gates which human workflow
//! is engaged, so a missing or unrecognized value blocks the handover and
//! notifies the user directly, one distinct message per failing field.
//! Silent defaults are never applied.
//!
//! On success the classification is merged into the attributes and the
//! subscription is swapped to the workflow target (remove-then-create),
//! with the merge and the creation fanned out together after the removals.

use std::sync::Arc;

use crate::application::attributes::AttributeAccessor;
use crate::application::subscriptions::SubscriptionManager;
use crate::domain::attributes::{AttributePatch, IDENTIFIED_AREA, IDENTIFIED_SERVICE};
use crate::domain::conversation::ConversationRef;
use crate::domain::errors::{ErrorCode, RelayError};
use crate::ports::{ConversationPlatform, UserNotifier, WebhookTarget};

use super::{conversation_from_session_header, ToolReply};

/// Default success string returned to the tool layer.
pub const DEFAULT_HANDOVER_SUCCESS: &str = "Conversation handed over";

const NOTIFY_MISSING_SERVICE: &str = "No pudimos transferir tu conversación: aún no identificamos \
    el servicio sobre el que necesitas ayuda. ¿Me lo confirmas?";
const NOTIFY_UNKNOWN_SERVICE: &str = "No pudimos transferir tu conversación: el servicio indicado \
    no corresponde a ninguno de nuestros equipos. ¿Me confirmas el servicio?";
const NOTIFY_MISSING_AREA: &str = "No pudimos transferir tu conversación: aún no identificamos el \
    área responsable. ¿Me confirmas el área con la que necesitas hablar?";
const NOTIFY_UNKNOWN_AREA: &str = "No pudimos transferir tu conversación: el área indicada no \
    corresponde a ninguno de nuestros equipos. ¿Me confirmas el área?";

/// Classification enumerations and workflow defaults, loaded externally.
#[derive(Debug, Clone, Default)]
pub struct HandoverConfig {
    /// Workflow engaged when the invocation names none.
    pub default_flow_sid: Option<String>,

    /// Valid `identifiedService` values.
    pub known_services: Vec<String>,

    /// Valid `identifiedArea` values.
    pub known_areas: Vec<String>,
}

/// A handover tool invocation.
#[derive(Debug, Clone, Default)]
pub struct HandoverCommand {
    /// Raw `x-session-id` header value.
    pub session_header: Option<String>,

    /// Target workflow; falls back to the configured default.
    pub flow_sid: Option<String>,

    pub identified_service: Option<String>,
    pub identified_area: Option<String>,

    /// Caller-supplied success string override.
    pub success_message: Option<String>,
}

pub struct HandoverHandler {
    subscriptions: SubscriptionManager,
    attributes: AttributeAccessor,
    platform: Arc<dyn ConversationPlatform>,
    notifier: Arc<dyn UserNotifier>,
    config: HandoverConfig,
}

impl HandoverHandler {
    pub fn new(
        platform: Arc<dyn ConversationPlatform>,
        notifier: Arc<dyn UserNotifier>,
        config: HandoverConfig,
    ) -> Self {
        Self {
            subscriptions: SubscriptionManager::new(platform.clone()),
            attributes: AttributeAccessor::new(platform.clone()),
            platform,
            notifier,
            config,
        }
    }

    pub async fn handle(&self, cmd: HandoverCommand) -> Result<ToolReply, RelayError> {
        let conversation = match conversation_from_session_header(cmd.session_header.as_deref()) {
            Ok(conversation) => conversation,
            Err(err) => {
                tracing::error!(error = %err, "handover tool called without a valid session");
                return Ok(ToolReply::Ignored);
            }
        };

        let Some(flow_sid) = cmd
            .flow_sid
            .clone()
            .filter(|sid| !sid.is_empty())
            .or_else(|| self.config.default_flow_sid.clone())
        else {
            return Err(RelayError::new(
                ErrorCode::MissingWorkflow,
                "unable to hand over conversation: no workflow id configured",
            ));
        };

        let service = self
            .validated(
                &conversation,
                "identifiedService",
                cmd.identified_service.as_deref(),
                &self.config.known_services,
                NOTIFY_MISSING_SERVICE,
                NOTIFY_UNKNOWN_SERVICE,
            )
            .await?;
        let area = self
            .validated(
                &conversation,
                "identifiedArea",
                cmd.identified_area.as_deref(),
                &self.config.known_areas,
                NOTIFY_MISSING_AREA,
                NOTIFY_UNKNOWN_AREA,
            )
            .await?;

        self.subscriptions.remove_all(&conversation).await?;

        let patch = AttributePatch::new()
            .set(IDENTIFIED_SERVICE, service.clone())
            .set(IDENTIFIED_AREA, area.clone());
        let merge = self.attributes.merge(&conversation, &patch);
        let create = self.platform.create_webhook(
            &conversation,
            WebhookTarget::HumanWorkflow {
                flow_sid: flow_sid.clone(),
            },
        );
        tokio::try_join!(merge, create)?;

        tracing::info!(
            conversation = %conversation,
            flow_sid = %flow_sid,
            service = %service,
            area = %area,
            "conversation handed over"
        );
        Ok(ToolReply::Success(
            cmd.success_message
                .unwrap_or_else(|| DEFAULT_HANDOVER_SUCCESS.to_string()),
        ))
    }

    /// Validate one classification field against its enumeration, notifying
    /// the user with the field-specific message on failure.
    async fn validated(
        &self,
        conversation: &ConversationRef,
        field: &str,
        value: Option<&str>,
        known: &[String],
        missing_notice: &str,
        unknown_notice: &str,
    ) -> Result<String, RelayError> {
        match value {
            None | Some("") => {
                self.notify(conversation, missing_notice).await;
                Err(RelayError::new(
                    ErrorCode::MissingClassification,
                    format!("{} is required for handover", field),
                )
                .with_detail("field", field))
            }
            Some(value) if !known.iter().any(|candidate| candidate == value) => {
                self.notify(conversation, unknown_notice).await;
                Err(RelayError::new(
                    ErrorCode::UnknownClassification,
                    format!("unrecognized {} '{}'", field, value),
                )
                .with_detail("field", field))
            }
            Some(value) => Ok(value.to_string()),
        }
    }

    async fn notify(&self, conversation: &ConversationRef, body: &str) {
        if let Err(err) = self.notifier.notify(conversation, body).await {
            tracing::warn!(
                conversation = %conversation,
                error = %err,
                "failed to notify user about blocked handover"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MockNotifier, MockPlatform};
    use crate::domain::routing::WebhookKind;
    use crate::ports::ConversationWebhook;
    use serde_json::json;

    fn config() -> HandoverConfig {
        HandoverConfig {
            default_flow_sid: Some("FW_default".to_string()),
            known_services: vec!["billing".to_string(), "support".to_string()],
            known_areas: vec!["invoices".to_string(), "refunds".to_string()],
        }
    }

    fn command() -> HandoverCommand {
        HandoverCommand {
            session_header: Some("webhook:conversations__IS1/CH1".to_string()),
            flow_sid: None,
            identified_service: Some("billing".to_string()),
            identified_area: Some("invoices".to_string()),
            success_message: None,
        }
    }

    fn handler(
        platform: Arc<MockPlatform>,
        notifier: Arc<MockNotifier>,
    ) -> HandoverHandler {
        HandoverHandler::new(platform, notifier, config())
    }

    #[tokio::test]
    async fn successful_handover_swaps_subscription_and_merges_classification() {
        let platform = Arc::new(MockPlatform::new().with_webhooks(vec![ConversationWebhook {
            sid: "WH1".to_string(),
            kind: WebhookKind::AssistantCallback,
        }]));
        let notifier = Arc::new(MockNotifier::new());

        let reply = handler(platform.clone(), notifier.clone())
            .handle(command())
            .await
            .unwrap();

        assert_eq!(
            reply,
            ToolReply::Success(DEFAULT_HANDOVER_SUCCESS.to_string())
        );

        let webhooks = platform.webhooks.lock().unwrap();
        assert_eq!(webhooks.len(), 1);
        assert_eq!(webhooks[0].kind, WebhookKind::HumanWorkflow);

        let attributes = platform.attributes.lock().unwrap();
        assert_eq!(attributes.get(IDENTIFIED_SERVICE), Some(&json!("billing")));
        assert_eq!(attributes.get(IDENTIFIED_AREA), Some(&json!("invoices")));
        assert!(notifier.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_service_blocks_handover_and_notifies() {
        let platform = Arc::new(MockPlatform::new());
        let notifier = Arc::new(MockNotifier::new());
        let mut cmd = command();
        cmd.identified_service = Some("lottery".to_string());

        let err = handler(platform.clone(), notifier.clone())
            .handle(cmd)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownClassification);
        assert!(platform.webhooks.lock().unwrap().is_empty());
        assert!(platform.attribute_writes.lock().unwrap().is_empty());

        let notices = notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("servicio"));
    }

    #[tokio::test]
    async fn missing_service_and_missing_area_notify_distinctly() {
        let platform = Arc::new(MockPlatform::new());
        let notifier = Arc::new(MockNotifier::new());

        let mut no_service = command();
        no_service.identified_service = None;
        let err = handler(platform.clone(), notifier.clone())
            .handle(no_service)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingClassification);
        assert_eq!(err.details.get("field").map(String::as_str), Some("identifiedService"));

        let mut no_area = command();
        no_area.identified_area = None;
        let err = handler(platform.clone(), notifier.clone())
            .handle(no_area)
            .await
            .unwrap_err();
        assert_eq!(err.details.get("field").map(String::as_str), Some("identifiedArea"));

        let notices = notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 2);
        assert_ne!(notices[0], notices[1]);
    }

    #[tokio::test]
    async fn missing_flow_sid_without_default_is_a_hard_failure() {
        let platform = Arc::new(MockPlatform::new());
        let notifier = Arc::new(MockNotifier::new());
        let handler = HandoverHandler::new(
            platform.clone(),
            notifier,
            HandoverConfig {
                default_flow_sid: None,
                ..config()
            },
        );

        let err = handler.handle(command()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingWorkflow);
        assert!(platform.webhooks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_flow_sid_overrides_the_default() {
        let platform = Arc::new(MockPlatform::new());
        let notifier = Arc::new(MockNotifier::new());
        let mut cmd = command();
        cmd.flow_sid = Some("FW_explicit".to_string());
        cmd.success_message = Some("Transferido".to_string());

        let reply = handler(platform.clone(), notifier)
            .handle(cmd)
            .await
            .unwrap();
        assert_eq!(reply, ToolReply::Success("Transferido".to_string()));
    }

    #[tokio::test]
    async fn bad_session_header_is_an_informational_no_op() {
        let platform = Arc::new(MockPlatform::new());
        let notifier = Arc::new(MockNotifier::new());
        let mut cmd = command();
        cmd.session_header = None;

        let reply = handler(platform.clone(), notifier)
            .handle(cmd)
            .await
            .unwrap();
        assert_eq!(reply, ToolReply::Ignored);
        assert!(platform.webhooks.lock().unwrap().is_empty());
    }
}
