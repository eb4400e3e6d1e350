//! Notification service.

use std::collections::HashMap;

use chirp_common::{AppError, AppResult, IdGenerator, Page};
use chirp_db::{
    entities::notification::{self, NotificationType},
    entities::{post, profile},
    repositories::{NotificationRepository, PostRepository, ProfileRepository},
};
use chrono::{Duration, Utc};
use sea_orm::Set;

use crate::services::media::MediaService;
use crate::services::profile::ProfileCard;

/// Window within which an equivalent event refreshes the existing
/// notification instead of inserting a duplicate.
const DEDUP_WINDOW_HOURS: i64 = 24;

/// Notification with actor and referenced-post context.
///
/// `actor` and `post` are absent when the referenced rows have been deleted
/// since the notification was written.
pub struct EnrichedNotification {
    /// The underlying notification row.
    pub notification: notification::Model,
    /// The user whose action triggered the notification.
    pub actor: Option<ProfileCard>,
    /// The referenced post, for post-bearing notification types.
    pub post: Option<post::Model>,
    /// The referenced post's author.
    pub post_author: Option<ProfileCard>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    profile_repo: ProfileRepository,
    post_repo: PostRepository,
    media: MediaService,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        profile_repo: ProfileRepository,
        post_repo: PostRepository,
        media: MediaService,
    ) -> Self {
        Self {
            notification_repo,
            profile_repo,
            post_repo,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a notification for a recipient.
    ///
    /// Self-notifications are dropped silently. An equivalent row (same
    /// recipient, actor, type, and post reference) within the trailing
    /// dedup window is refreshed in place: its timestamp moves to now and
    /// it becomes unread again.
    pub async fn notify(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        post_id: Option<&str>,
    ) -> AppResult<()> {
        if recipient_id == actor_id {
            return Ok(());
        }

        let since = Utc::now() - Duration::hours(DEDUP_WINDOW_HOURS);
        if let Some(existing) = self
            .notification_repo
            .find_recent_equivalent(
                recipient_id,
                actor_id,
                notification_type.clone(),
                post_id,
                since,
            )
            .await?
        {
            let mut active: notification::ActiveModel = existing.into();
            active.created_at = Set(Utc::now().into());
            active.is_read = Set(false);
            self.notification_repo.update(active).await?;
            return Ok(());
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(recipient_id.to_string()),
            notification_type: Set(notification_type),
            actor_id: Set(actor_id.to_string()),
            post_id: Set(post_id.map(ToString::to_string)),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };
        self.notification_repo.create(model).await?;
        Ok(())
    }

    /// Notify a user that someone followed them.
    pub async fn notify_follow(&self, recipient_id: &str, actor_id: &str) -> AppResult<()> {
        self.notify(recipient_id, actor_id, NotificationType::Follow, None)
            .await
    }

    /// Notify a post author that someone liked their post.
    pub async fn notify_like(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        self.notify(recipient_id, actor_id, NotificationType::Like, Some(post_id))
            .await
    }

    /// Notify a post author that someone reposted their post.
    pub async fn notify_repost(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        self.notify(
            recipient_id,
            actor_id,
            NotificationType::Repost,
            Some(post_id),
        )
        .await
    }

    /// Notify a post author of a reply. `post_id` is the reply itself.
    pub async fn notify_reply(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        self.notify(
            recipient_id,
            actor_id,
            NotificationType::Reply,
            Some(post_id),
        )
        .await
    }

    /// Notify a mentioned user. `post_id` is the mentioning post.
    pub async fn notify_mention(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        self.notify(
            recipient_id,
            actor_id,
            NotificationType::Mention,
            Some(post_id),
        )
        .await
    }

    /// Notify a post author that their post was quoted. `post_id` is the
    /// quoting post.
    pub async fn notify_quote(
        &self,
        recipient_id: &str,
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        self.notify(
            recipient_id,
            actor_id,
            NotificationType::Quote,
            Some(post_id),
        )
        .await
    }

    /// List a user's notifications, newest first.
    pub async fn list(
        &self,
        caller: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedNotification>> {
        let rows = self
            .notification_repo
            .find_by_user(caller, limit + 1, until_id, false)
            .await?;
        let page = Page::from_overfetch(rows, limit, |n| n.id.clone());

        // Batch-load referenced posts, then every profile the page touches:
        // actors plus the authors of referenced posts.
        let post_ids: Vec<String> = page.items.iter().filter_map(|n| n.post_id.clone()).collect();
        let posts = self.post_repo.find_by_ids(&post_ids).await?;

        let mut profile_ids: Vec<String> =
            page.items.iter().map(|n| n.actor_id.clone()).collect();
        profile_ids.extend(posts.iter().map(|p| p.author_id.clone()));
        profile_ids.sort();
        profile_ids.dedup();
        let profiles = self.profile_repo.find_by_user_ids(&profile_ids).await?;

        let profile_map: HashMap<String, profile::Model> = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();
        let post_map: HashMap<String, post::Model> =
            posts.into_iter().map(|p| (p.id.clone(), p)).collect();

        Ok(page.map(|n| {
            let actor = profile_map
                .get(&n.actor_id)
                .map(|p| ProfileCard::from_profile(p, &self.media));
            let post = n.post_id.as_ref().and_then(|id| post_map.get(id)).cloned();
            let post_author = post
                .as_ref()
                .and_then(|p| profile_map.get(&p.author_id))
                .map(|p| ProfileCard::from_profile(p, &self.media));
            EnrichedNotification {
                notification: n,
                actor,
                post,
                post_author,
            }
        }))
    }

    /// Mark one notification as read.
    pub async fn mark_as_read(&self, caller: &str, notification_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("notification {notification_id}")))?;

        if notification.user_id != caller {
            return Err(AppError::Forbidden(
                "Cannot mark another user's notification".to_string(),
            ));
        }

        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark all of the caller's notifications as read, returning how many
    /// were affected.
    pub async fn mark_all_as_read(&self, caller: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(caller).await
    }

    /// Number of unread notifications for the caller.
    pub async fn unread_count(&self, caller: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(caller).await
    }

    /// Delete one notification. Only the recipient can.
    pub async fn delete(&self, caller: &str, notification_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("notification {notification_id}")))?;

        if notification.user_id != caller {
            return Err(AppError::Forbidden(
                "Cannot delete another user's notification".to_string(),
            ));
        }

        self.notification_repo.delete(notification_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::Config;
    use chirp_common::config::{ContentConfig, DatabaseConfig, MediaConfig, ServerConfig};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            media: MediaConfig { base_url: None },
            content: ContentConfig::default(),
        }
    }

    fn create_test_notification(id: &str, user_id: &str, actor_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            notification_type: NotificationType::Like,
            actor_id: actor_id.to_string(),
            post_id: Some("post1".to_string()),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        notification_db: Arc<sea_orm::DatabaseConnection>,
    ) -> NotificationService {
        let notification_repo = NotificationRepository::new(notification_db);
        let profile_repo = ProfileRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let post_repo = PostRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let media = MediaService::new(&create_test_config());
        NotificationService::new(notification_repo, profile_repo, post_repo, media)
    }

    #[tokio::test]
    async fn test_notify_skips_self() {
        let notification_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(notification_db);

        // No queries are mocked: reaching the database would fail the test
        let result = service
            .notify("user1", "user1", NotificationType::Like, Some("post1"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_notify_refreshes_recent_equivalent() {
        let mut existing = create_test_notification("n1", "user1", "user2");
        existing.is_read = true;

        let mut refreshed = existing.clone();
        refreshed.is_read = false;

        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[refreshed]])
                .into_connection(),
        );

        let service = create_test_service(notification_db);

        let result = service
            .notify("user1", "user2", NotificationType::Like, Some("post1"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_notify_inserts_when_no_equivalent() {
        let created = create_test_notification("n1", "user1", "user2");

        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .append_query_results([[created]])
                .into_connection(),
        );

        let service = create_test_service(notification_db);

        let result = service
            .notify("user1", "user2", NotificationType::Like, Some("post1"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_mark_as_read_requires_recipient() {
        let notification = create_test_notification("n1", "user1", "user2");

        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notification]])
                .into_connection(),
        );

        let service = create_test_service(notification_db);

        let result = service.mark_as_read("intruder", "n1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mark_as_read_missing_notification() {
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(notification_db);

        let result = service.mark_as_read("user1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_recipient() {
        let notification = create_test_notification("n1", "user1", "user2");

        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notification]])
                .into_connection(),
        );

        let service = create_test_service(notification_db);

        let result = service.delete("user2", "n1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
