//! Routing-state cleanup.
//!
//! Deletes the relay's ephemeral keys from a conversation's attributes:
//! the typing flag and both classification keys. Pass-through keys such as
//! `infoUser` survive. Used when a conversation is recycled for a new
//! session.

use std::sync::Arc;

use crate::application::attributes::AttributeAccessor;
use crate::domain::attributes::{
    AttributePatch, ASSISTANT_IS_TYPING, IDENTIFIED_AREA, IDENTIFIED_SERVICE,
};
use crate::domain::conversation::ConversationRef;
use crate::domain::errors::RelayError;
use crate::ports::ConversationPlatform;

pub struct CleanAttributesHandler {
    attributes: AttributeAccessor,
}

impl CleanAttributesHandler {
    pub fn new(platform: Arc<dyn ConversationPlatform>) -> Self {
        Self {
            attributes: AttributeAccessor::new(platform),
        }
    }

    pub async fn handle(&self, conversation: &ConversationRef) -> Result<(), RelayError> {
        let patch = AttributePatch::new()
            .remove(ASSISTANT_IS_TYPING)
            .remove(IDENTIFIED_SERVICE)
            .remove(IDENTIFIED_AREA);
        let merged = self.attributes.merge(conversation, &patch).await?;

        tracing::info!(
            conversation = %conversation,
            remaining_keys = merged.len(),
            "conversation attributes cleaned"
        );
        Ok(())
    }
}
