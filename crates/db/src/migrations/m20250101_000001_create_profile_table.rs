//! Create profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profile::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Profile::UserId).string_len(128).not_null())
                    .col(ColumnDef::new(Profile::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Profile::DisplayName).string_len(256).not_null())
                    .col(ColumnDef::new(Profile::Bio).text())
                    .col(ColumnDef::new(Profile::Location).string_len(256))
                    .col(ColumnDef::new(Profile::Website).string_len(1024))
                    .col(ColumnDef::new(Profile::AvatarUrl).string_len(1024))
                    .col(ColumnDef::new(Profile::BannerUrl).string_len(1024))
                    .col(ColumnDef::new(Profile::AvatarFileId).string_len(128))
                    .col(ColumnDef::new(Profile::BannerFileId).string_len(128))
                    .col(ColumnDef::new(Profile::Verified).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profile::FollowersCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Profile::FollowingCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Profile::PostsCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user_id (one profile per auth user)
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_user_id")
                    .table(Profile::Table)
                    .col(Profile::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: username (handles are globally unique)
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_username")
                    .table(Profile::Table)
                    .col(Profile::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for the suggestion pool)
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_created_at")
                    .table(Profile::Table)
                    .col(Profile::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
    UserId,
    Username,
    DisplayName,
    Bio,
    Location,
    Website,
    AvatarUrl,
    BannerUrl,
    AvatarFileId,
    BannerFileId,
    Verified,
    FollowersCount,
    FollowingCount,
    PostsCount,
    CreatedAt,
}
