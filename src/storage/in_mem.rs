use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::Storage;
use crate::{
    error::ConversationError,
    types::{ConversationKey, StoredState},
};

/// Process-local storage: one map behind one mutex.
#[derive(Debug, Default)]
pub struct InMemStorage {
    states: Mutex<HashMap<ConversationKey, StoredState>>,
}

impl InMemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.lock().await.is_empty()
    }
}

#[async_trait]
impl Storage for InMemStorage {
    async fn get(&self, key: &ConversationKey) -> Result<StoredState, ConversationError> {
        self.states
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or(ConversationError::KeyNotFound)
    }

    async fn set(&self, key: &ConversationKey, state: StoredState) -> Result<(), ConversationError> {
        self.states.lock().await.insert(key.clone(), state);
        Ok(())
    }

    async fn delete(&self, key: &ConversationKey) -> Result<(), ConversationError> {
        self.states.lock().await.remove(key);
        Ok(())
    }
}
