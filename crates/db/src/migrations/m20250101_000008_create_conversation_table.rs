//! Create conversation table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Conversation::Participant1Id)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversation::Participant2Id)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversation::LastMessageAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Conversation::LastMessagePreview)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (participant1_id, participant2_id) - one thread per pair,
        // participants are stored in sorted order
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_participants")
                    .table(Conversation::Table)
                    .col(Conversation::Participant1Id)
                    .col(Conversation::Participant2Id)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: participant1_id (for listing a user's conversations)
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_participant1")
                    .table(Conversation::Table)
                    .col(Conversation::Participant1Id)
                    .to_owned(),
            )
            .await?;

        // Index: participant2_id
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_participant2")
                    .table(Conversation::Table)
                    .col(Conversation::Participant2Id)
                    .to_owned(),
            )
            .await?;

        // Index: last_message_at (conversation lists sort by recency)
        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_last_message_at")
                    .table(Conversation::Table)
                    .col(Conversation::LastMessageAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conversation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Conversation {
    Table,
    Id,
    Participant1Id,
    Participant2Id,
    LastMessageAt,
    LastMessagePreview,
    CreatedAt,
}
