//! Repost repository.

use std::sync::Arc;

use crate::entities::{Repost, repost};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};

/// Repost repository for database operations.
#[derive(Clone)]
pub struct RepostRepository {
    db: Arc<DatabaseConnection>,
}

impl RepostRepository {
    /// Create a new repost repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a repost by user and post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<repost::Model>> {
        Repost::find()
            .filter(repost::Column::UserId.eq(user_id))
            .filter(repost::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has reposted a post.
    pub async fn has_reposted(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_post(user_id, post_id)
            .await?
            .is_some())
    }

    /// Create a new repost.
    pub async fn create(&self, model: repost::ActiveModel) -> AppResult<repost::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of the given posts, return the IDs of those the user has reposted.
    ///
    /// Used for batch enrichment of post lists.
    pub async fn find_reposted_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        Repost::find()
            .filter(repost::Column::UserId.eq(user_id))
            .filter(repost::Column::PostId.is_in(post_ids.to_vec()))
            .select_only()
            .column(repost::Column::PostId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_repost(id: &str, user_id: &str, post_id: &str) -> repost::Model {
        repost::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_reposted_true() {
        let repost = create_test_repost("r1", "user1", "post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[repost.clone()]])
                .into_connection(),
        );

        let repo = RepostRepository::new(db);
        let result = repo.has_reposted("user1", "post1").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_has_reposted_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<repost::Model>::new()])
                .into_connection(),
        );

        let repo = RepostRepository::new(db);
        let result = repo.has_reposted("user1", "post2").await.unwrap();

        assert!(!result);
    }
}
