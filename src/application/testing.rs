//! In-memory port doubles shared by the application-layer tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::attributes::AttributeDocument;
use crate::domain::conversation::ConversationRef;
use crate::ports::{
    AssistantClient, AssistantDispatch, AssistantError, ConversationPlatform,
    ConversationWebhook, NewMessage, NotifyError, PlatformError, UserNotifier, WebhookTarget,
};

/// In-memory conversations platform.
pub(crate) struct MockPlatform {
    pub attributes: Mutex<AttributeDocument>,
    pub webhooks: Mutex<Vec<ConversationWebhook>>,
    pub messages: Mutex<Vec<NewMessage>>,
    pub participants: usize,
    pub attribute_writes: Mutex<Vec<AttributeDocument>>,
    fail_removals: bool,
    next_sid: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            attributes: Mutex::new(AttributeDocument::new()),
            webhooks: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            participants: 1,
            attribute_writes: Mutex::new(Vec::new()),
            fail_removals: false,
            next_sid: AtomicU64::new(1),
        }
    }

    pub fn with_attributes(self, attributes: AttributeDocument) -> Self {
        *self.attributes.lock().unwrap() = attributes;
        self
    }

    pub fn with_webhooks(self, webhooks: Vec<ConversationWebhook>) -> Self {
        *self.webhooks.lock().unwrap() = webhooks;
        self
    }

    pub fn with_participants(mut self, participants: usize) -> Self {
        self.participants = participants;
        self
    }

    pub fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    pub fn message_bodies(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.body.clone().unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl ConversationPlatform for MockPlatform {
    async fn read_attributes(
        &self,
        _conversation: &ConversationRef,
    ) -> Result<AttributeDocument, PlatformError> {
        Ok(self.attributes.lock().unwrap().clone())
    }

    async fn write_attributes(
        &self,
        _conversation: &ConversationRef,
        attributes: &AttributeDocument,
    ) -> Result<(), PlatformError> {
        *self.attributes.lock().unwrap() = attributes.clone();
        self.attribute_writes.lock().unwrap().push(attributes.clone());
        Ok(())
    }

    async fn participant_count(
        &self,
        _conversation: &ConversationRef,
    ) -> Result<usize, PlatformError> {
        Ok(self.participants)
    }

    async fn create_message(
        &self,
        _conversation: &ConversationRef,
        message: NewMessage,
    ) -> Result<(), PlatformError> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }

    async fn list_webhooks(
        &self,
        _conversation: &ConversationRef,
    ) -> Result<Vec<ConversationWebhook>, PlatformError> {
        Ok(self.webhooks.lock().unwrap().clone())
    }

    async fn remove_webhook(
        &self,
        _conversation: &ConversationRef,
        webhook_sid: &str,
    ) -> Result<(), PlatformError> {
        if self.fail_removals {
            return Err(PlatformError::api("removal refused"));
        }
        self.webhooks
            .lock()
            .unwrap()
            .retain(|webhook| webhook.sid != webhook_sid);
        Ok(())
    }

    async fn create_webhook(
        &self,
        _conversation: &ConversationRef,
        target: WebhookTarget,
    ) -> Result<(), PlatformError> {
        let sid = format!("WH{}", self.next_sid.fetch_add(1, Ordering::Relaxed));
        self.webhooks.lock().unwrap().push(ConversationWebhook {
            sid,
            kind: target.kind(),
        });
        Ok(())
    }
}

/// Recording assistant client.
pub(crate) struct MockAssistant {
    pub dispatches: Mutex<Vec<(String, AssistantDispatch)>>,
    fail: bool,
}

impl MockAssistant {
    pub fn new() -> Self {
        Self {
            dispatches: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            dispatches: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.lock().unwrap().len()
    }
}

#[async_trait]
impl AssistantClient for MockAssistant {
    async fn send_message(
        &self,
        assistant_sid: &str,
        request: AssistantDispatch,
    ) -> Result<(), AssistantError> {
        if self.fail {
            return Err(AssistantError::timeout("assistant unreachable"));
        }
        self.dispatches
            .lock()
            .unwrap()
            .push((assistant_sid.to_string(), request));
        Ok(())
    }
}

/// Recording user notifier.
pub(crate) struct MockNotifier {
    pub notices: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserNotifier for MockNotifier {
    async fn notify(
        &self,
        _conversation: &ConversationRef,
        body: &str,
    ) -> Result<(), NotifyError> {
        self.notices.lock().unwrap().push(body.to_string());
        Ok(())
    }
}
