use std::sync::Arc;

use crate::{
    event::ConversationEvent, handler::Handler, key_strategy::KeyStrategy, storage::Storage,
};

pub type Filter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Optional settings for [`super::Conversation::new`].
pub struct ConversationOpts<E: ConversationEvent> {
    pub(super) exits: Vec<Arc<dyn Handler<E>>>,
    pub(super) storage: Option<Arc<dyn Storage>>,
    pub(super) key_strategy: KeyStrategy,
    pub(super) allow_re_entry: bool,
    pub(super) filter: Option<Filter<E>>,
    pub(super) name: Option<String>,
    pub(super) serialize_per_key: bool,
}

impl<E: ConversationEvent> Default for ConversationOpts<E> {
    fn default() -> Self {
        ConversationOpts {
            exits: vec![],
            storage: None,
            key_strategy: KeyStrategy::default(),
            allow_re_entry: false,
            filter: None,
            name: None,
            serialize_per_key: false,
        }
    }
}

impl<E: ConversationEvent> ConversationOpts<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers tried before the current step's handlers whenever a step is
    /// active. An exit that returns no transition ends the conversation.
    pub fn exits(mut self, exits: Vec<Arc<dyn Handler<E>>>) -> Self {
        self.exits = exits;
        self
    }

    /// Defaults to a fresh [`crate::storage::InMemStorage`].
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn key_strategy(mut self, key_strategy: KeyStrategy) -> Self {
        self.key_strategy = key_strategy;
        self
    }

    /// Keep entry points eligible while a step is active. They are tried
    /// after exits and the current step's handlers.
    pub fn allow_re_entry(mut self, allow_re_entry: bool) -> Self {
        self.allow_re_entry = allow_re_entry;
        self
    }

    /// Events rejected by the filter are ignored before any key is derived.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Handle events for the same key one at a time, holding a per-key lock
    /// from the state read until the state write.
    pub fn serialize_per_key(mut self, serialize_per_key: bool) -> Self {
        self.serialize_per_key = serialize_per_key;
        self
    }
}
