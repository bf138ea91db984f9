//! Conversation attributes document and its merge policy.
//!
//! The attributes document is a shared JSON object persisted by the hosting
//! platform. The platform offers no partial update: every mutation is a full
//! read, a shallow merge of the caller's delta, and a full overwrite. Two
//! overlapping read-modify-write sequences clobber each other at document
//! granularity (last writer wins); the defense is keeping the delta narrow
//! and the read-to-write window minimal, never rewriting keys the caller
//! did not name.

use serde_json::{Map, Value};

/// Set while a message is awaiting the assistant's response.
pub const ASSISTANT_IS_TYPING: &str = "assistantIsTyping";

/// Service classification attached by the assistant before handover.
pub const IDENTIFIED_SERVICE: &str = "identifiedService";

/// Area classification attached by the assistant before handover.
pub const IDENTIFIED_AREA: &str = "identifiedArea";

/// Opaque caller-supplied context, passed through untouched.
pub const INFO_USER: &str = "infoUser";

/// The conversation's attributes document as stored by the platform.
pub type AttributeDocument = Map<String, Value>;

/// Shallow delta applied to an attributes document.
///
/// An entry of `Some(value)` sets the key, `None` removes it. Keys absent
/// from the patch are never touched. Entries apply in insertion order, so a
/// later entry for the same key wins.
#[derive(Debug, Clone, Default)]
pub struct AttributePatch {
    entries: Vec<(String, Option<Value>)>,
}

impl AttributePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), Some(value.into())));
        self
    }

    /// Remove `key` from the document.
    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.entries.push((key.into(), None));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the patch to a document read from the store, producing the full
    /// document to write back.
    pub fn apply(&self, mut document: AttributeDocument) -> AttributeDocument {
        for (key, value) in &self.entries {
            match value {
                Some(value) => {
                    document.insert(key.clone(), value.clone());
                }
                None => {
                    document.remove(key);
                }
            }
        }
        document
    }
}
