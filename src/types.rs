use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConversationError;

/// Identity under which a conversation's step is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ConversationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConversationError::EmptyKey);
        }
        Ok(ConversationKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConversationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    /// Current step; empty means the key is not conversing.
    pub step: String,
    /// Steps of the enclosing conversations, outermost first.
    pub parent_stack: Vec<String>,
}

impl StoredState {
    pub fn new(step: impl Into<String>) -> Self {
        StoredState {
            step: step.into(),
            parent_stack: vec![],
        }
    }

    pub fn with_parents(mut self, parent_stack: Vec<String>) -> Self {
        self.parent_stack = parent_stack;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.step.is_empty()
    }
}
