//! Conversation State Accessor.
//!
//! Read-modify-write wrapper over the conversation's attributes document.
//! The backing store offers no compare-and-swap, so two overlapping
//! sequences on the same conversation can clobber each other at document
//! granularity; the accessor reads immediately before writing and merges
//! only the keys the caller names, which keeps the lost-update window as
//! small as the protocol allows. The residual race is an accepted
//! limitation, not an error condition.

use std::sync::Arc;

use crate::domain::attributes::{AttributeDocument, AttributePatch};
use crate::domain::conversation::ConversationRef;
use crate::ports::{ConversationPlatform, PlatformError};

#[derive(Clone)]
pub struct AttributeAccessor {
    platform: Arc<dyn ConversationPlatform>,
}

impl AttributeAccessor {
    pub fn new(platform: Arc<dyn ConversationPlatform>) -> Self {
        Self { platform }
    }

    /// Current attributes document.
    pub async fn read(
        &self,
        conversation: &ConversationRef,
    ) -> Result<AttributeDocument, PlatformError> {
        self.platform.read_attributes(conversation).await
    }

    /// Shallow-merge `patch` into the current document and write the result
    /// back in full. Returns the document as written.
    pub async fn merge(
        &self,
        conversation: &ConversationRef,
        patch: &AttributePatch,
    ) -> Result<AttributeDocument, PlatformError> {
        let current = self.platform.read_attributes(conversation).await?;
        let merged = patch.apply(current);
        self.platform.write_attributes(conversation, &merged).await?;
        Ok(merged)
    }
}
