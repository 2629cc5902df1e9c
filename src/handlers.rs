use std::{collections::HashMap, sync::Arc};
use teloxide::{
    prelude::*,
    types::{KeyboardRemove, ParseMode, ReplyMarkup, Update, UpdateKind, UserId},
    utils::command::BotCommands,
};
use tera::{Context, Tera};
use tg_conversation::{
    config::Config, endpoint, Conversation, ConversationEvent, ConversationOpts, Handler,
    HandlerError, HandlerResult, Handlers, Storage, Transition,
};

use crate::keyboards::get_confirm_keyboard;

pub const AWAITING_NAME: &str = "awaiting_name";
pub const AWAITING_AGE: &str = "awaiting_age";
pub const AWAITING_CONTACT: &str = "awaiting_contact";
pub const AWAITING_PHONE: &str = "awaiting_phone";
pub const CONFIRM: &str = "confirm";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "register a pet.")]
    Register,
    #[command(description = "add an emergency contact.")]
    Contact,
    #[command(description = "cancel the registration.")]
    Cancel,
}

#[derive(Clone)]
pub struct BotEvent {
    pub bot: Bot,
    pub tera: Arc<Tera>,
    pub bot_id: UserId,
    pub bot_name: String,
    pub update: Update,
}

impl ConversationEvent for BotEvent {
    fn sender_id(&self) -> Option<i64> {
        self.update.sender_id()
    }

    fn chat_id(&self) -> Option<i64> {
        self.update.chat_id()
    }

    fn bot_id(&self) -> Option<i64> {
        i64::try_from(self.bot_id.0).ok()
    }
}

impl BotEvent {
    fn text(&self) -> Option<&str> {
        match &self.update.kind {
            UpdateKind::Message(message) => message.text(),
            _ => None,
        }
    }

    fn is_command(&self, command: Command) -> bool {
        self.text()
            .and_then(|text| parse_command(text, &self.bot_name))
            .is_some_and(|parsed| parsed == command)
    }

    fn is_plain_text(&self) -> bool {
        self.text().is_some_and(|text| !text.starts_with('/'))
    }

    fn is_answer(&self, answer: &str) -> bool {
        self.text()
            .is_some_and(|text| text.trim().eq_ignore_ascii_case(answer))
    }

    async fn reply(
        &self,
        template: &str,
        context: &Context,
        markup: Option<ReplyMarkup>,
    ) -> Result<(), HandlerError> {
        let chat_id = ChatId(self.chat_id().ok_or("update has no chat")?);
        let answer = self.tera.render(template, context)?;
        let request = self
            .bot
            .send_message(chat_id, answer)
            .parse_mode(ParseMode::Html);
        match markup {
            Some(markup) => request.reply_markup(markup).await?,
            None => request.await?,
        };
        Ok(())
    }
}

/// Accepts both `/register` and `/register@BotName` addressed to this bot.
fn parse_command(text: &str, bot_name: &str) -> Option<Command> {
    Command::parse(text, bot_name).ok()
}

fn text_context(name: &str, event: &BotEvent) -> Context {
    let mut context = Context::new();
    context.insert(name, event.text().unwrap_or_default().trim());
    context
}

async fn start_registration(event: BotEvent) -> HandlerResult {
    event.reply("ask_name.html", &Context::new(), None).await?;
    Ok(Some(Transition::advance_to(AWAITING_NAME)))
}

async fn set_name(event: BotEvent) -> HandlerResult {
    let context = text_context("name", &event);
    event.reply("ask_age.html", &context, None).await?;
    Ok(Some(Transition::advance_to(AWAITING_AGE)))
}

async fn set_age(event: BotEvent) -> HandlerResult {
    let age = event.text().and_then(|text| text.trim().parse::<u32>().ok());
    match age {
        Some(_) => {
            event.reply("ask_contact.html", &Context::new(), None).await?;
            Ok(Some(Transition::advance_to(AWAITING_CONTACT)))
        }
        None => {
            event.reply("invalid_age.html", &Context::new(), None).await?;
            Ok(None)
        }
    }
}

async fn confirm(event: BotEvent) -> HandlerResult {
    let markup = ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    event.reply("done.html", &Context::new(), Some(markup)).await?;
    Ok(Some(Transition::end()))
}

async fn restart(event: BotEvent) -> HandlerResult {
    let markup = ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    event.reply("ask_name.html", &Context::new(), Some(markup)).await?;
    Ok(Some(Transition::advance_to(AWAITING_NAME)))
}

async fn cancel(event: BotEvent) -> HandlerResult {
    let markup = ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    event.reply("cancelled.html", &Context::new(), Some(markup)).await?;
    Ok(None)
}

async fn start_contact(event: BotEvent) -> HandlerResult {
    event.reply("ask_phone.html", &Context::new(), None).await?;
    Ok(Some(Transition::advance_to(AWAITING_PHONE)))
}

async fn set_phone(event: BotEvent) -> HandlerResult {
    let context = text_context("phone", &event);
    let markup = ReplyMarkup::Keyboard(get_confirm_keyboard());
    event.reply("confirm.html", &context, Some(markup)).await?;
    Ok(Some(Transition::end_to_parent(Transition::advance_to(
        CONFIRM,
    ))))
}

fn has_identity(event: &BotEvent) -> bool {
    event.sender_id().is_some() && event.chat_id().is_some()
}

/// Nested flow collecting an emergency contact for the pet.
pub fn contact_conversation(storage: Arc<dyn Storage>, config: &Config) -> Conversation<BotEvent> {
    let mut states: HashMap<String, Handlers<BotEvent>> = HashMap::new();
    states.insert(
        AWAITING_PHONE.to_string(),
        vec![endpoint(|event: &BotEvent| event.is_plain_text(), set_phone)],
    );

    Conversation::new(
        vec![endpoint(
            |event: &BotEvent| event.is_command(Command::Contact),
            start_contact,
        )],
        states,
        ConversationOpts::new()
            .name("contact")
            .storage(storage)
            .key_strategy(config.key_strategy)
            // A cancelled registration leaves this flow mid-way; `/contact`
            // has to start it over.
            .allow_re_entry(true)
            .filter(has_identity),
    )
}

pub fn registration_conversation(
    storage: Arc<dyn Storage>,
    contact: Arc<Conversation<BotEvent>>,
    config: &Config,
) -> Conversation<BotEvent> {
    let mut states: HashMap<String, Handlers<BotEvent>> = HashMap::new();
    states.insert(
        AWAITING_NAME.to_string(),
        vec![endpoint(|event: &BotEvent| event.is_plain_text(), set_name)],
    );
    states.insert(
        AWAITING_AGE.to_string(),
        vec![endpoint(|event: &BotEvent| event.is_plain_text(), set_age)],
    );
    let contact: Arc<dyn Handler<BotEvent>> = contact;
    states.insert(AWAITING_CONTACT.to_string(), vec![contact]);
    states.insert(
        CONFIRM.to_string(),
        vec![
            endpoint(|event: &BotEvent| event.is_answer("yes"), confirm),
            endpoint(|event: &BotEvent| event.is_answer("no"), restart),
        ],
    );

    Conversation::new(
        vec![endpoint(
            |event: &BotEvent| event.is_command(Command::Register),
            start_registration,
        )],
        states,
        ConversationOpts::new()
            .name("registration")
            .storage(storage)
            .key_strategy(config.key_strategy)
            .allow_re_entry(config.allow_re_entry)
            .exits(vec![endpoint(
                |event: &BotEvent| event.is_command(Command::Cancel),
                cancel,
            )])
            .serialize_per_key(true)
            .filter(has_identity),
    )
}
