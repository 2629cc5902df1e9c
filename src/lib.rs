pub mod config;
pub mod connection;
pub mod conversation;
pub mod entity;
pub mod error;
pub mod event;
pub mod handler;
pub mod key_strategy;
pub mod migration;
pub mod storage;
pub mod transition;
pub mod types;

pub use conversation::{Conversation, ConversationOpts, Handlers};
pub use error::ConversationError;
pub use event::ConversationEvent;
pub use handler::{endpoint, Handler, HandlerError, HandlerResult};
pub use key_strategy::KeyStrategy;
pub use storage::{DatabaseStorage, InMemStorage, Storage};
pub use transition::Transition;
pub use types::{ConversationKey, StoredState};
