use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConversationStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConversationStates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConversationStates::Namespace)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversationStates::ConversationKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConversationStates::Step).string().not_null())
                    .col(
                        ColumnDef::new(ConversationStates::ParentStack)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversationStates::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-conversation-states-namespace-key")
                    .table(ConversationStates::Table)
                    .col(ConversationStates::Namespace)
                    .col(ConversationStates::ConversationKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConversationStates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConversationStates {
    Table,
    Id,
    Namespace,
    ConversationKey,
    Step,
    ParentStack,
    UpdatedAt,
}
