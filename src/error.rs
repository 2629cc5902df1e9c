use thiserror::Error;

use crate::handler::HandlerError;

#[derive(Debug, Error)]
pub enum ConversationError {
    /// No state is stored for the key, i.e. there is no active conversation.
    #[error("conversation key not found")]
    KeyNotFound,
    /// The key strategy found no sender/chat identity on the event.
    #[error("empty conversation key")]
    EmptyKey,
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("can't encode conversation state: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("handler failed: {0}")]
    Handler(HandlerError),
}

impl ConversationError {
    /// Unwraps errors coming back from a nested conversation so they are not
    /// wrapped twice; anything else stays an opaque handler error.
    pub fn from_handler(err: HandlerError) -> Self {
        match err.downcast::<ConversationError>() {
            Ok(err) => *err,
            Err(err) => ConversationError::Handler(err),
        }
    }
}
