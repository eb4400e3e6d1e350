//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Post::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Post::AuthorId).string_len(128).not_null())
                    .col(ColumnDef::new(Post::Content).text().not_null())
                    .col(ColumnDef::new(Post::MediaUrls).json_binary())
                    .col(ColumnDef::new(Post::ReplyToId).string_len(32))
                    .col(ColumnDef::new(Post::QuotedPostId).string_len(32))
                    .col(ColumnDef::new(Post::Mentions).json_binary().not_null())
                    .col(ColumnDef::new(Post::Hashtags).json_binary().not_null())
                    .col(ColumnDef::new(Post::LikesCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::RepostsCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::RepliesCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::ViewsCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // No foreign keys on reply_to_id / quoted_post_id: replies and quotes
        // outlive the post they point at.

        // Index: author_id (for profile timelines)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_id")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: reply_to_id (for listing replies)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_reply_to_id")
                    .table(Post::Table)
                    .col(Post::ReplyToId)
                    .to_owned(),
            )
            .await?;

        // Index: quoted_post_id
        manager
            .create_index(
                Index::create()
                    .name("idx_post_quoted_post_id")
                    .table(Post::Table)
                    .col(Post::QuotedPostId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for feed pagination)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_created_at")
                    .table(Post::Table)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    AuthorId,
    Content,
    MediaUrls,
    ReplyToId,
    QuotedPostId,
    Mentions,
    Hashtags,
    LikesCount,
    RepostsCount,
    RepliesCount,
    ViewsCount,
    CreatedAt,
}
