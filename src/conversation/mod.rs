mod locks;
mod opts;

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

use crate::{
    error::ConversationError,
    event::ConversationEvent,
    handler::{Handler, HandlerResult},
    key_strategy::KeyStrategy,
    storage::{InMemStorage, Storage},
    transition::Transition,
    types::{ConversationKey, StoredState},
};
use locks::KeyLocks;

pub use opts::{ConversationOpts, Filter};

pub type Handlers<E> = Vec<Arc<dyn Handler<E>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Exit,
    Step,
    EntryPoint,
}

/// Step-based router: sends each update only to the handlers registered for
/// the sender's current step.
pub struct Conversation<E: ConversationEvent> {
    name: String,
    entry_points: Handlers<E>,
    states: HashMap<String, Handlers<E>>,
    exits: Handlers<E>,
    storage: Arc<dyn Storage>,
    key_strategy: KeyStrategy,
    allow_re_entry: bool,
    filter: Option<Filter<E>>,
    locks: Option<KeyLocks>,
}

impl<E: ConversationEvent> Conversation<E> {
    pub fn new(
        entry_points: Handlers<E>,
        states: HashMap<String, Handlers<E>>,
        opts: ConversationOpts<E>,
    ) -> Self {
        Conversation {
            name: opts.name.unwrap_or_else(|| "conversation".to_string()),
            entry_points,
            states,
            exits: opts.exits,
            storage: opts
                .storage
                .unwrap_or_else(|| Arc::new(InMemStorage::new())),
            key_strategy: opts.key_strategy,
            allow_re_entry: opts.allow_re_entry,
            filter: opts.filter,
            locks: opts.serialize_per_key.then(KeyLocks::default),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn key_strategy(&self) -> KeyStrategy {
        self.key_strategy
    }

    /// Stored state for the event's key.
    pub async fn current_state(&self, event: &E) -> Result<StoredState, ConversationError> {
        let key = self.key_strategy.derive_key(event)?;
        self.storage.get(&key).await
    }

    pub async fn check_update(&self, event: &E) -> bool {
        self.matches(event).await
    }

    /// Runs the first eligible handler and applies its transition.
    ///
    /// Nothing is written to storage when the handler or storage fails, so the
    /// same event can be delivered again.
    pub async fn handle_update(&self, event: &E) -> Result<(), ConversationError> {
        if let Some(transition) = self.dispatch(event, &[]).await? {
            log::warn!(
                "{}: dropping {:?}, there is no parent conversation",
                self.name,
                transition
            );
        }
        Ok(())
    }

    fn accepts(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    async fn load(&self, key: &ConversationKey) -> Result<Option<StoredState>, ConversationError> {
        match self.storage.get(key).await {
            Ok(state) => Ok(Some(state)),
            Err(ConversationError::KeyNotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn matches(&self, event: &E) -> bool {
        if !self.accepts(event) {
            return false;
        }
        let Ok(key) = self.key_strategy.derive_key(event) else {
            return false;
        };
        let state = match self.load(&key).await {
            Ok(state) => state,
            Err(err) => {
                log::warn!("{}: can't read state for {}: {}", self.name, key, err);
                return false;
            }
        };

        let step = state.as_ref().map_or("", |state| state.step.as_str());
        self.find_handler(event, step).await.is_some()
    }

    fn candidates(&self, step: &str) -> Vec<(Origin, &Arc<dyn Handler<E>>)> {
        let mut candidates = vec![];

        if !step.is_empty() {
            candidates.extend(self.exits.iter().map(|handler| (Origin::Exit, handler)));
            match self.states.get(step) {
                Some(handlers) => {
                    candidates.extend(handlers.iter().map(|handler| (Origin::Step, handler)))
                }
                None => log::warn!("{}: no handlers for step {:?}", self.name, step),
            }
        }

        if step.is_empty() || self.allow_re_entry {
            candidates.extend(
                self.entry_points
                    .iter()
                    .map(|handler| (Origin::EntryPoint, handler)),
            );
        }

        candidates
    }

    async fn find_handler(&self, event: &E, step: &str) -> Option<(Origin, &Arc<dyn Handler<E>>)> {
        for (origin, handler) in self.candidates(step) {
            if handler.check_update(event).await {
                return Some((origin, handler));
            }
        }
        None
    }

    /// Returns the transition to hand to the enclosing conversation, if any.
    async fn dispatch(
        &self,
        event: &E,
        parent_steps: &[String],
    ) -> Result<Option<Transition>, ConversationError> {
        if !self.accepts(event) {
            return Ok(None);
        }
        let key = self.key_strategy.derive_key(event)?;

        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(&key).await),
            None => None,
        };

        let state = self.load(&key).await?.filter(StoredState::is_active);
        let step = state
            .as_ref()
            .map(|state| state.step.clone())
            .unwrap_or_default();

        let Some((origin, handler)) = self.find_handler(event, &step).await else {
            return Ok(None);
        };
        log::debug!(
            "{}: {:?} handler matched for {} at step {:?}",
            self.name,
            origin,
            key,
            step
        );

        let mut handler_steps = match &state {
            Some(state) => state.parent_stack.clone(),
            None => parent_steps.to_vec(),
        };
        if !step.is_empty() {
            handler_steps.push(step);
        }

        let transition = handler
            .handle_nested(event, &handler_steps)
            .await
            .map_err(ConversationError::from_handler)?;

        let transition = match (origin, transition) {
            (Origin::Exit, None) => Some(Transition::End),
            (_, transition) => transition,
        };

        match transition {
            Some(transition) => self.apply(&key, state, transition, parent_steps).await,
            None => Ok(None),
        }
    }

    async fn apply(
        &self,
        key: &ConversationKey,
        state: Option<StoredState>,
        transition: Transition,
        parent_steps: &[String],
    ) -> Result<Option<Transition>, ConversationError> {
        match transition {
            Transition::AdvanceTo(step) => {
                let parent_stack = match state {
                    Some(state) => state.parent_stack,
                    None => parent_steps.to_vec(),
                };
                log::debug!("{}: {} advances to {:?}", self.name, key, step);
                self.storage
                    .set(key, StoredState { step, parent_stack })
                    .await?;
                Ok(None)
            }
            Transition::End => {
                log::debug!("{}: {} ended", self.name, key);
                self.storage.delete(key).await?;
                Ok(None)
            }
            Transition::EndToParent(parent) => {
                let resumed = match &state {
                    Some(state) => state.parent_stack.last(),
                    None => parent_steps.last(),
                };
                log::debug!(
                    "{}: {} ended, parent resumes from {:?}",
                    self.name,
                    key,
                    resumed
                );
                self.storage.delete(key).await?;
                Ok(Some(*parent))
            }
        }
    }
}

#[async_trait]
impl<E: ConversationEvent> Handler<E> for Conversation<E> {
    async fn check_update(&self, event: &E) -> bool {
        self.matches(event).await
    }

    async fn handle_update(&self, event: &E) -> HandlerResult {
        Ok(self.dispatch(event, &[]).await?)
    }

    async fn handle_nested(&self, event: &E, parent_steps: &[String]) -> HandlerResult {
        Ok(self.dispatch(event, parent_steps).await?)
    }
}
