use async_trait::async_trait;
use std::{error::Error, future::Future, marker::PhantomData, sync::Arc};

use crate::{event::ConversationEvent, transition::Transition};

pub type HandlerError = Box<dyn Error + Send + Sync>;

pub type HandlerResult = Result<Option<Transition>, HandlerError>;

/// Anything a conversation can dispatch to: leaf endpoints and nested
/// conversations alike.
#[async_trait]
pub trait Handler<E: ConversationEvent>: Send + Sync {
    /// Whether this handler would run for the event. Must not change state.
    async fn check_update(&self, event: &E) -> bool;

    async fn handle_update(&self, event: &E) -> HandlerResult;

    /// Runs the handler on behalf of an enclosing conversation.
    /// `parent_steps` lists the enclosing steps, outermost first.
    async fn handle_nested(&self, event: &E, _parent_steps: &[String]) -> HandlerResult {
        self.handle_update(event).await
    }
}

/// Leaf handler built from a predicate and an async callback.
pub struct Endpoint<E, P, F> {
    predicate: P,
    callback: F,
    _event: PhantomData<fn(&E)>,
}

#[async_trait]
impl<E, P, F, Fut> Handler<E> for Endpoint<E, P, F>
where
    E: ConversationEvent + Clone,
    P: Fn(&E) -> bool + Send + Sync,
    F: Fn(E) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn check_update(&self, event: &E) -> bool {
        (self.predicate)(event)
    }

    async fn handle_update(&self, event: &E) -> HandlerResult {
        (self.callback)(event.clone()).await
    }
}

pub fn endpoint<E, P, F, Fut>(predicate: P, callback: F) -> Arc<dyn Handler<E>>
where
    E: ConversationEvent + Clone,
    P: Fn(&E) -> bool + Send + Sync + 'static,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(Endpoint {
        predicate,
        callback,
        _event: PhantomData,
    })
}
