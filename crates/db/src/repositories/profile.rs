//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, sea_query::Expr,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by its owning auth user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by its owning auth user ID, returning an error if not found.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(user_id.to_string()))
    }

    /// Find a profile by username. Usernames are stored lowercase.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Username.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by username, returning an error if not found.
    pub async fn get_by_username(&self, username: &str) -> AppResult<profile::Model> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(username.to_string()))
    }

    /// Find profiles by auth user IDs.
    pub async fn find_by_user_ids(&self, user_ids: &[String]) -> AppResult<Vec<profile::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::UserId.is_in(user_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find profiles by usernames (all lowercase).
    pub async fn find_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<profile::Model>> {
        if usernames.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::Username.is_in(usernames.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recently created profiles (the follow-suggestion pool).
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<profile::Model>> {
        Profile::find()
            .order_by_desc(profile::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search profiles by username or display name.
    /// Falls back to LIKE if full-text search fails.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<profile::Model>> {
        match self.search_fulltext(query, limit).await {
            Ok(results) => Ok(results),
            Err(_) => self.search_like(query, limit).await,
        }
    }

    /// Full-text search using `PostgreSQL` tsvector/tsquery.
    pub async fn search_fulltext(&self, query: &str, limit: u64) -> AppResult<Vec<profile::Model>> {
        let escaped_query = query
            .replace('\\', "\\\\")
            .replace('\'', "''")
            .replace(['&', '|', '!', '(', ')', ':'], " ");

        let sql = r"
            SELECT
                id, user_id, username, display_name, bio, location, website,
                avatar_url, banner_url, avatar_file_id, banner_file_id,
                verified, followers_count, following_count, posts_count,
                created_at
            FROM profile
            WHERE to_tsvector('simple', username || ' ' || display_name)
                @@ plainto_tsquery('simple', $1)
            ORDER BY
                ts_rank(
                    to_tsvector('simple', username || ' ' || display_name),
                    plainto_tsquery('simple', $1)
                ) DESC,
                followers_count DESC
            LIMIT $2
        ";

        Profile::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [escaped_query.into(), (limit as i64).into()],
            ))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fallback LIKE-based search for when full-text search is unavailable.
    pub async fn search_like(&self, query: &str, limit: u64) -> AppResult<Vec<profile::Model>> {
        use sea_orm::Condition;

        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let query_lower = query.to_lowercase();

        let condition = Condition::any()
            .add(profile::Column::Username.like(format!("%{query_lower}%")))
            .add(profile::Column::DisplayName.like(&search_pattern));

        Profile::find()
            .filter(condition)
            .order_by_desc(profile::Column::FollowersCount)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment followers count atomically (single UPDATE query, no fetch).
    pub async fn increment_followers_count(&self, user_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowersCount,
                Expr::col(profile::Column::FollowersCount).add(1),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement followers count atomically (single UPDATE query, no fetch).
    pub async fn decrement_followers_count(&self, user_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowersCount,
                Expr::cust("GREATEST(followers_count - 1, 0)"),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment following count atomically (single UPDATE query, no fetch).
    pub async fn increment_following_count(&self, user_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowingCount,
                Expr::col(profile::Column::FollowingCount).add(1),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement following count atomically (single UPDATE query, no fetch).
    pub async fn decrement_following_count(&self, user_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::FollowingCount,
                Expr::cust("GREATEST(following_count - 1, 0)"),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment posts count atomically (single UPDATE query, no fetch).
    pub async fn increment_posts_count(&self, user_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::PostsCount,
                Expr::col(profile::Column::PostsCount).add(1),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement posts count atomically (single UPDATE query, no fetch).
    pub async fn decrement_posts_count(&self, user_id: &str) -> AppResult<()> {
        Profile::update_many()
            .col_expr(
                profile::Column::PostsCount,
                Expr::cust("GREATEST(posts_count - 1, 0)"),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_profile(id: &str, user_id: &str, username: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            display_name: "Test User".to_string(),
            bio: None,
            location: None,
            website: None,
            avatar_url: None,
            banner_url: None,
            avatar_file_id: None,
            banner_file_id: None,
            verified: false,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_id_found() {
        let profile = create_test_profile("p1", "user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_user_id("user1").await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.id, "p1");
        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_find_by_username_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_username("nonexistent").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_by_username_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.get_by_username("ghost").await;

        assert!(result.is_err());
        match result {
            Err(AppError::ProfileNotFound(name)) => assert_eq!(name, "ghost"),
            _ => panic!("Expected ProfileNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_ids_empty_input_skips_query() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_user_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_recent() {
        let p1 = create_test_profile("p1", "user1", "alice");
        let p2 = create_test_profile("p2", "user2", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.find_recent(20).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
