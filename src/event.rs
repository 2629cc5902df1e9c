use teloxide::types::Update;

/// What the conversation layer needs to know about an incoming update.
///
/// Everything else on the event is only interesting to handler predicates.
pub trait ConversationEvent: Send + Sync + 'static {
    fn sender_id(&self) -> Option<i64>;

    fn chat_id(&self) -> Option<i64>;

    /// Bot the update was delivered to. Keys are namespaced by it when set.
    fn bot_id(&self) -> Option<i64> {
        None
    }
}

impl ConversationEvent for Update {
    fn sender_id(&self) -> Option<i64> {
        self.user().and_then(|user| i64::try_from(user.id.0).ok())
    }

    fn chat_id(&self) -> Option<i64> {
        self.chat().map(|chat| chat.id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_update_exposes_sender_and_chat() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 1,
                "message": {
                    "message_id": 10,
                    "date": 1700000000,
                    "chat": {"id": -1001234, "type": "group", "title": "Pets"},
                    "from": {"id": 123, "is_bot": false, "first_name": "Alex"},
                    "text": "hello"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(update.sender_id(), Some(123));
        assert_eq!(update.chat_id(), Some(-1001234));
        assert_eq!(update.bot_id(), None);
    }
}
