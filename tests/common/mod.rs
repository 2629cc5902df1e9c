#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tg_conversation::{
    endpoint, Conversation, ConversationError, ConversationEvent, Handler, HandlerResult,
    Transition,
};

pub const USER_ID: i64 = 123;
pub const CHAT_ID: i64 = 1234;

#[derive(Debug, Clone)]
pub struct TestUpdate {
    pub bot_id: Option<i64>,
    pub sender: Option<i64>,
    pub chat: Option<i64>,
    pub text: String,
}

impl TestUpdate {
    pub fn message(sender: i64, chat: i64, text: &str) -> Self {
        TestUpdate {
            bot_id: None,
            sender: Some(sender),
            chat: Some(chat),
            text: text.to_string(),
        }
    }

    pub fn command(sender: i64, chat: i64, name: &str, args: &[&str]) -> Self {
        let mut text = format!("/{}", name);
        for arg in args {
            text.push(' ');
            text.push_str(arg);
        }
        Self::message(sender, chat, &text)
    }

    /// An update carrying neither a sender nor a chat.
    pub fn poll() -> Self {
        TestUpdate {
            bot_id: None,
            sender: None,
            chat: None,
            text: String::new(),
        }
    }

    pub fn for_bot(mut self, bot_id: i64) -> Self {
        self.bot_id = Some(bot_id);
        self
    }

    pub fn is_command(&self, name: &str) -> bool {
        self.text
            .split_whitespace()
            .next()
            .and_then(|word| word.strip_prefix('/'))
            .is_some_and(|command| command == name)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.text.contains(text)
    }
}

impl ConversationEvent for TestUpdate {
    fn sender_id(&self) -> Option<i64> {
        self.sender
    }

    fn chat_id(&self) -> Option<i64> {
        self.chat
    }

    fn bot_id(&self) -> Option<i64> {
        self.bot_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

/// Handler that counts its runs and returns `outcome`.
pub fn respond<P>(
    predicate: P,
    outcome: Option<Transition>,
    counter: &Counter,
) -> Arc<dyn Handler<TestUpdate>>
where
    P: Fn(&TestUpdate) -> bool + Send + Sync + 'static,
{
    let counter = counter.clone();
    endpoint(predicate, move |_update: TestUpdate| {
        let counter = counter.clone();
        let outcome = outcome.clone();
        async move {
            counter.hit();
            let result: HandlerResult = Ok(outcome);
            result
        }
    })
}

pub fn on_command(
    name: &'static str,
    outcome: Option<Transition>,
    counter: &Counter,
) -> Arc<dyn Handler<TestUpdate>> {
    respond(move |update: &TestUpdate| update.is_command(name), outcome, counter)
}

pub fn on_text(
    text: &'static str,
    outcome: Option<Transition>,
    counter: &Counter,
) -> Arc<dyn Handler<TestUpdate>> {
    respond(move |update: &TestUpdate| update.contains(text), outcome, counter)
}

/// Handler that fails on its first `failures` runs, then returns `outcome`.
pub fn flaky_text(
    text: &'static str,
    failures: usize,
    outcome: Option<Transition>,
    counter: &Counter,
) -> Arc<dyn Handler<TestUpdate>> {
    let counter = counter.clone();
    endpoint(
        move |update: &TestUpdate| update.contains(text),
        move |_update: TestUpdate| {
            let counter = counter.clone();
            let outcome = outcome.clone();
            async move {
                let result: HandlerResult = if counter.hit() <= failures {
                    Err("handler failed".into())
                } else {
                    Ok(outcome)
                };
                result
            }
        },
    )
}

pub fn advance(step: &str) -> Option<Transition> {
    Some(Transition::advance_to(step))
}

pub fn end() -> Option<Transition> {
    Some(Transition::end())
}

/// Asserts the stored step for the update's key; an empty step means the key
/// must be absent.
pub async fn expect_step(conv: &Conversation<TestUpdate>, update: &TestUpdate, step: &str) {
    match conv.current_state(update).await {
        Ok(state) => assert_eq!(
            state.step,
            step,
            "{}: unexpected step for {:?}",
            conv.name(),
            update
        ),
        Err(ConversationError::KeyNotFound) => assert!(
            step.is_empty(),
            "{}: expected step {:?}, key not found",
            conv.name(),
            step
        ),
        Err(err) => panic!("{}: can't read state: {}", conv.name(), err),
    }
}

/// Checks the update is accepted at `from`, handles it, and checks it lands
/// at `to`.
pub async fn run_handler(
    conv: &Conversation<TestUpdate>,
    update: &TestUpdate,
    from: &str,
    to: &str,
) {
    will_run_handler(conv, update, from).await;
    if let Err(err) = conv.handle_update(update).await {
        panic!("{}: unexpected error from handler: {}", conv.name(), err);
    }
    expect_step(conv, update, to).await;
}

pub async fn will_run_handler(conv: &Conversation<TestUpdate>, update: &TestUpdate, from: &str) {
    expect_step(conv, update, from).await;
    assert!(
        conv.check_update(update).await,
        "{}: expected a handler to match {:?}",
        conv.name(),
        update.text
    );
}
