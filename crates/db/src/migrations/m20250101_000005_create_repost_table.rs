//! Create repost table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repost::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Repost::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Repost::UserId).string_len(128).not_null())
                    .col(ColumnDef::new(Repost::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Repost::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_repost_post")
                            .from(Repost::Table, Repost::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, post_id) - one repost per user per post
        manager
            .create_index(
                Index::create()
                    .name("idx_repost_user_post")
                    .table(Repost::Table)
                    .col(Repost::UserId)
                    .col(Repost::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: post_id
        manager
            .create_index(
                Index::create()
                    .name("idx_repost_post_id")
                    .table(Repost::Table)
                    .col(Repost::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Repost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Repost {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
