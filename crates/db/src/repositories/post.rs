//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find posts by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Likes and reposts go with it via foreign keys.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get top-level posts by author (paginated, newest first).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::ReplyToId.is_null())
            .order_by_desc(post::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get replies written by an author (paginated, newest first).
    pub async fn find_replies_by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::ReplyToId.is_not_null())
            .order_by_desc(post::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get replies to a post (paginated, oldest first).
    pub async fn find_replies(
        &self,
        post_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::ReplyToId.eq(post_id))
            .order_by_asc(post::Column::Id)
            .limit(limit);

        if let Some(since) = since_id {
            query = query.filter(post::Column::Id.gt(since));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the home feed: top-level posts from the given authors
    /// (paginated, newest first).
    pub async fn find_feed(
        &self,
        author_ids: &[String],
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut query = Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .filter(post::Column::ReplyToId.is_null())
            .order_by_desc(post::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the global feed: all top-level posts (paginated, newest first).
    pub async fn find_global(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::ReplyToId.is_null())
            .order_by_desc(post::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get posts created since a point in time (newest first).
    pub async fn find_created_since(
        &self,
        since: chrono::DateTime<chrono::Utc>,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::CreatedAt.gte(since))
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search posts by content using `PostgreSQL` full-text search.
    /// Falls back to LIKE if full-text search fails.
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        match self.search_fulltext(query, limit, until_id).await {
            Ok(results) => Ok(results),
            Err(_) => self.search_like(query, limit, until_id).await,
        }
    }

    /// Full-text search using `PostgreSQL` tsvector/tsquery.
    /// Uses GIN index for efficient searching.
    pub async fn search_fulltext(
        &self,
        query: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        // Escape query for tsquery
        let escaped_query = query
            .replace('\\', "\\\\")
            .replace('\'', "''")
            .replace(['&', '|', '!', '(', ')', ':'], " ");

        let mut conditions = vec!["TRUE".to_string()];

        if let Some(until) = until_id {
            conditions.push(format!("id < '{}'", until.replace('\'', "''")));
        }

        let where_clause = conditions.join(" AND ");

        // Full-text search query with relevance ranking
        let sql = format!(
            r"
            SELECT
                id, author_id, content, media_urls, reply_to_id, quoted_post_id,
                mentions, hashtags, likes_count, reposts_count, replies_count,
                views_count, created_at
            FROM post
            WHERE {where_clause}
                AND to_tsvector('simple', content) @@ plainto_tsquery('simple', $1)
            ORDER BY
                ts_rank(to_tsvector('simple', content), plainto_tsquery('simple', $1)) DESC,
                created_at DESC
            LIMIT $2
            "
        );

        Post::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                &sql,
                [escaped_query.into(), (limit as i64).into()],
            ))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fallback LIKE-based search for when full-text search is unavailable.
    pub async fn search_like(
        &self,
        query: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));

        let mut q = Post::find()
            .filter(post::Column::Content.like(&search_pattern))
            .order_by_desc(post::Column::Id)
            .limit(limit);

        if let Some(until) = until_id {
            q = q.filter(post::Column::Id.lt(until));
        }

        q.all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get trending posts: the most engaged posts among recent ones.
    ///
    /// Looks at the 100 newest posts in the window and ranks them by
    /// likes + reposts * 2 + replies.
    pub async fn find_trending(&self, limit: u64, hours: i64) -> AppResult<Vec<post::Model>> {
        let since = chrono::Utc::now() - chrono::Duration::hours(hours);

        let sql = r"
            SELECT
                id, author_id, content, media_urls, reply_to_id, quoted_post_id,
                mentions, hashtags, likes_count, reposts_count, replies_count,
                views_count, created_at
            FROM (
                SELECT * FROM post
                WHERE created_at >= $1
                ORDER BY created_at DESC
                LIMIT 100
            ) AS recent
            ORDER BY likes_count + reposts_count * 2 + replies_count DESC, created_at DESC
            LIMIT $2
        ";

        Post::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                [since.into(), (limit as i64).into()],
            ))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment likes count atomically (single UPDATE query, no fetch).
    pub async fn increment_likes_count(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::col(post::Column::LikesCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement likes count atomically (single UPDATE query, no fetch).
    pub async fn decrement_likes_count(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::cust("GREATEST(likes_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment reposts count atomically (single UPDATE query, no fetch).
    pub async fn increment_reposts_count(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::RepostsCount,
                Expr::col(post::Column::RepostsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment replies count atomically (single UPDATE query, no fetch).
    pub async fn increment_replies_count(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::RepliesCount,
                Expr::col(post::Column::RepliesCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment views count atomically (single UPDATE query, no fetch).
    pub async fn increment_views_count(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::ViewsCount,
                Expr::col(post::Column::ViewsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_post(id: &str, author_id: &str, content: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            media_urls: None,
            reply_to_id: None,
            quoted_post_id: None,
            mentions: json!([]),
            hashtags: json!([]),
            likes_count: 0,
            reposts_count: 0,
            replies_count: 0,
            views_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let post = create_test_post("post1", "user1", "Hello world");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_id("post1").await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.id, "post1");
        assert_eq!(found.content, "Hello world");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        assert!(result.is_err());
        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_author() {
        let post1 = create_test_post("post1", "user1", "First");
        let post2 = create_test_post("post2", "user1", "Second");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post1, post2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_author("user1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_feed_empty_authors_skips_query() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_feed(&[], 10, None).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_increment_likes_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.increment_likes_count("post1").await;

        assert!(result.is_ok());
    }
}
