mod database;
mod in_mem;

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::ConversationError,
    types::{ConversationKey, StoredState},
};

pub use database::DatabaseStorage;
pub use in_mem::InMemStorage;

/// Keyed persistence for conversation state.
///
/// Implementations must be safe to call concurrently for different keys and
/// must not lose updates for the same key.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns [`ConversationError::KeyNotFound`] when nothing is stored.
    async fn get(&self, key: &ConversationKey) -> Result<StoredState, ConversationError>;

    async fn set(&self, key: &ConversationKey, state: StoredState) -> Result<(), ConversationError>;

    async fn delete(&self, key: &ConversationKey) -> Result<(), ConversationError>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get(&self, key: &ConversationKey) -> Result<StoredState, ConversationError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &ConversationKey, state: StoredState) -> Result<(), ConversationError> {
        (**self).set(key, state).await
    }

    async fn delete(&self, key: &ConversationKey) -> Result<(), ConversationError> {
        (**self).delete(key).await
    }
}
