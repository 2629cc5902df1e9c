use std::{fmt, str::FromStr};

use crate::{error::ConversationError, event::ConversationEvent, types::ConversationKey};

/// How a conversation key is derived from an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStrategy {
    /// One conversation per user, shared across chats.
    Sender,
    /// One conversation per chat, shared by its members.
    Chat,
    #[default]
    SenderAndChat,
}

impl KeyStrategy {
    pub fn derive_key<E: ConversationEvent>(
        &self,
        event: &E,
    ) -> Result<ConversationKey, ConversationError> {
        let identity = match self {
            KeyStrategy::Sender => event.sender_id().map(|sender| sender.to_string()),
            KeyStrategy::Chat => event.chat_id().map(|chat| chat.to_string()),
            KeyStrategy::SenderAndChat => match (event.sender_id(), event.chat_id()) {
                (Some(sender), Some(chat)) => Some(format!("{}/{}", sender, chat)),
                _ => None,
            },
        };

        let identity = identity.ok_or(ConversationError::EmptyKey)?;
        match event.bot_id() {
            Some(bot_id) => ConversationKey::new(format!("{}/{}", bot_id, identity)),
            None => ConversationKey::new(identity),
        }
    }
}

impl fmt::Display for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyStrategy::Sender => "sender",
            KeyStrategy::Chat => "chat",
            KeyStrategy::SenderAndChat => "sender_and_chat",
        };
        f.write_str(name)
    }
}

impl FromStr for KeyStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "sender" => Ok(KeyStrategy::Sender),
            "chat" => Ok(KeyStrategy::Chat),
            "sender_and_chat" => Ok(KeyStrategy::SenderAndChat),
            other => Err(format!("unknown key strategy: {}", other)),
        }
    }
}
