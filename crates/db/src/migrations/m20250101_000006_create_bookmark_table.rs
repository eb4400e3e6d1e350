//! Create bookmark table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookmark::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookmark::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Bookmark::UserId).string_len(128).not_null())
                    .col(ColumnDef::new(Bookmark::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Bookmark::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // No foreign key on post_id: bookmarks survive deletion of the post.

        // Unique index: (user_id, post_id) - one bookmark per user per post
        manager
            .create_index(
                Index::create()
                    .name("idx_bookmark_user_post")
                    .table(Bookmark::Table)
                    .col(Bookmark::UserId)
                    .col(Bookmark::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for the bookmarks listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_bookmark_user_id")
                    .table(Bookmark::Table)
                    .col(Bookmark::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookmark::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bookmark {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}
