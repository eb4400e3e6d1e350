//! Conversation repository.

use std::sync::Arc;

use crate::entities::{Conversation, conversation};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Conversation repository for database operations.
///
/// Participant pairs are stored in sorted order so a thread between two
/// users exists exactly once no matter who opened it.
#[derive(Clone)]
pub struct ConversationRepository {
    db: Arc<DatabaseConnection>,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<conversation::Model>> {
        Conversation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a conversation by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<conversation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))
    }

    /// Find the conversation between two users, in either participant order.
    pub async fn find_by_participants(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> AppResult<Option<conversation::Model>> {
        let (p1, p2) = sorted_pair(user_a, user_b);

        Conversation::find()
            .filter(conversation::Column::Participant1Id.eq(p1))
            .filter(conversation::Column::Participant2Id.eq(p2))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new conversation.
    pub async fn create(&self, model: conversation::ActiveModel) -> AppResult<conversation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get conversations a user participates in, most recent activity first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<conversation::Model>> {
        use sea_orm::Condition;

        Conversation::find()
            .filter(
                Condition::any()
                    .add(conversation::Column::Participant1Id.eq(user_id))
                    .add(conversation::Column::Participant2Id.eq(user_id)),
            )
            .order_by_desc(conversation::Column::LastMessageAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Bump a conversation's last-activity marker and preview.
    pub async fn touch(
        &self,
        id: &str,
        preview: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        Conversation::update_many()
            .col_expr(conversation::Column::LastMessageAt, at.into())
            .col_expr(conversation::Column::LastMessagePreview, Expr::value(preview))
            .filter(conversation::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Order two user IDs so the smaller one comes first.
///
/// New conversation rows must store their participants in this order for
/// the pair lookup above to find them.
#[must_use]
pub fn sorted_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}
