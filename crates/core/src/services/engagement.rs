//! Engagement service: likes, reposts, and bookmarks.

use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    entities::{bookmark, post_like, repost},
    repositories::{BookmarkRepository, PostLikeRepository, PostRepository, RepostRepository},
};
use sea_orm::Set;

use crate::services::notification::NotificationService;

/// Engagement service for business logic.
///
/// Each relation is a unique edge per (user, post). Duplicate writes are
/// rejected with `Conflict` rather than treated as no-ops, so callers are
/// expected to know the current state.
#[derive(Clone)]
pub struct EngagementService {
    like_repo: PostLikeRepository,
    repost_repo: RepostRepository,
    bookmark_repo: BookmarkRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(
        like_repo: PostLikeRepository,
        repost_repo: RepostRepository,
        bookmark_repo: BookmarkRepository,
        post_repo: PostRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            like_repo,
            repost_repo,
            bookmark_repo,
            post_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post, notifying its author.
    pub async fn like(&self, caller: &str, post_id: &str) -> AppResult<post_like::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if self.like_repo.has_liked(caller, post_id).await? {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        let model = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(caller.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let like = self.like_repo.create(model).await?;

        self.post_repo.increment_likes_count(post_id).await?;
        self.notifications
            .notify_like(&post.author_id, caller, post_id)
            .await?;

        Ok(like)
    }

    /// Remove a like. The notification is not retracted.
    pub async fn unlike(&self, caller: &str, post_id: &str) -> AppResult<()> {
        self.post_repo.get_by_id(post_id).await?;

        if !self.like_repo.has_liked(caller, post_id).await? {
            return Err(AppError::NotFound("Like not found".to_string()));
        }

        self.like_repo.delete_by_user_and_post(caller, post_id).await?;
        self.post_repo.decrement_likes_count(post_id).await?;
        Ok(())
    }

    /// Repost a post, notifying its author. Reposts cannot be undone.
    pub async fn repost(&self, caller: &str, post_id: &str) -> AppResult<repost::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if self.repost_repo.has_reposted(caller, post_id).await? {
            return Err(AppError::Conflict("Already reposted".to_string()));
        }

        let model = repost::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(caller.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let repost = self.repost_repo.create(model).await?;

        self.post_repo.increment_reposts_count(post_id).await?;
        self.notifications
            .notify_repost(&post.author_id, caller, post_id)
            .await?;

        Ok(repost)
    }

    /// Bookmark a post. Bookmarks are private: no counter, no notification.
    pub async fn bookmark(&self, caller: &str, post_id: &str) -> AppResult<bookmark::Model> {
        self.post_repo.get_by_id(post_id).await?;

        if self.bookmark_repo.has_bookmarked(caller, post_id).await? {
            return Err(AppError::Conflict("Already bookmarked".to_string()));
        }

        let model = bookmark::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(caller.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.bookmark_repo.create(model).await
    }

    /// Remove a bookmark.
    ///
    /// Works without checking the post: bookmarks outlive post deletion and
    /// must stay removable once dangling.
    pub async fn unbookmark(&self, caller: &str, post_id: &str) -> AppResult<()> {
        if !self.bookmark_repo.has_bookmarked(caller, post_id).await? {
            return Err(AppError::NotFound("Bookmark not found".to_string()));
        }

        self.bookmark_repo
            .delete_by_user_and_post(caller, post_id)
            .await
    }
}
