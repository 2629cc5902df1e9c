use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{prelude::*, sea_query::OnConflict, ActiveValue};

use super::Storage;
use crate::{
    entity::conversation_states,
    error::ConversationError,
    types::{ConversationKey, StoredState},
};

/// Storage backed by the `conversation_states` table.
///
/// Every operation is a single statement, so it is atomic per key.
/// Conversations sharing a table must use different namespaces.
#[derive(Debug, Clone)]
pub struct DatabaseStorage {
    connection: DatabaseConnection,
    namespace: String,
}

impl DatabaseStorage {
    pub fn new(connection: DatabaseConnection, namespace: impl Into<String>) -> Self {
        DatabaseStorage {
            connection,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn select(&self, key: &ConversationKey) -> Select<conversation_states::Entity> {
        conversation_states::Entity::find()
            .filter(conversation_states::Column::Namespace.eq(self.namespace.as_str()))
            .filter(conversation_states::Column::ConversationKey.eq(key.as_str()))
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn get(&self, key: &ConversationKey) -> Result<StoredState, ConversationError> {
        let row = self
            .select(key)
            .one(&self.connection)
            .await?
            .ok_or(ConversationError::KeyNotFound)?;

        Ok(StoredState {
            step: row.step,
            parent_stack: serde_json::from_str(&row.parent_stack)?,
        })
    }

    async fn set(&self, key: &ConversationKey, state: StoredState) -> Result<(), ConversationError> {
        let parent_stack = serde_json::to_string(&state.parent_stack)?;

        conversation_states::Entity::insert(conversation_states::ActiveModel {
            namespace: ActiveValue::Set(self.namespace.clone()),
            conversation_key: ActiveValue::Set(key.as_str().to_string()),
            step: ActiveValue::Set(state.step),
            parent_stack: ActiveValue::Set(parent_stack),
            updated_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                conversation_states::Column::Namespace,
                conversation_states::Column::ConversationKey,
            ])
            .update_columns([
                conversation_states::Column::Step,
                conversation_states::Column::ParentStack,
                conversation_states::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(&self.connection)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &ConversationKey) -> Result<(), ConversationError> {
        conversation_states::Entity::delete_many()
            .filter(conversation_states::Column::Namespace.eq(self.namespace.as_str()))
            .filter(conversation_states::Column::ConversationKey.eq(key.as_str()))
            .exec(&self.connection)
            .await?;

        Ok(())
    }
}
