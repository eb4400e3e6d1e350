//! Add full-text search and trending indexes for posts and profiles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create GIN index for post content search
        // Uses 'simple' configuration for multi-language support
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_post_content_search
                ON post
                USING GIN (to_tsvector('simple', content));
                ",
            )
            .await?;

        // Create GIN index for profile search (username + display name)
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_profile_search
                ON profile
                USING GIN (
                    to_tsvector('simple', username || ' ' || display_name)
                );
                ",
            )
            .await?;

        // Create index for trending posts (sorted by engagement)
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_post_trending
                ON post (created_at DESC)
                WHERE likes_count > 0 OR reposts_count > 0 OR replies_count > 0;
                ",
            )
            .await?;

        // Create index for popular profiles (sorted by followers count)
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_profile_popular
                ON profile (followers_count DESC);
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_post_content_search;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_profile_search;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_post_trending;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_profile_popular;")
            .await?;

        Ok(())
    }
}
