//! Follow service.

use std::collections::HashMap;

use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    entities::{follow, profile},
    repositories::{FollowRepository, ProfileRepository},
};
use sea_orm::Set;

use crate::services::notification::NotificationService;
use crate::services::profile::{EnrichedProfile, ProfileService};

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    profile_repo: ProfileRepository,
    profiles: ProfileService,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        profile_repo: ProfileRepository,
        profiles: ProfileService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            follow_repo,
            profile_repo,
            profiles,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    pub async fn follow(&self, caller: &str, target_user_id: &str) -> AppResult<follow::Model> {
        if caller == target_user_id {
            return Err(AppError::InvalidArgument(
                "Cannot follow yourself".to_string(),
            ));
        }

        // Target must be a provisioned user
        self.profile_repo.get_by_user_id(target_user_id).await?;

        if self.follow_repo.is_following(caller, target_user_id).await? {
            return Err(AppError::Conflict("Already following".to_string()));
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(caller.to_string()),
            following_id: Set(target_user_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let follow = self.follow_repo.create(model).await?;

        self.profile_repo.increment_following_count(caller).await?;
        self.profile_repo
            .increment_followers_count(target_user_id)
            .await?;

        self.notifications.notify_follow(target_user_id, caller).await?;

        tracing::debug!(follower = %caller, target = %target_user_id, "Follow created");
        Ok(follow)
    }

    /// Unfollow a user. No notification is emitted.
    pub async fn unfollow(&self, caller: &str, target_user_id: &str) -> AppResult<()> {
        if !self.follow_repo.is_following(caller, target_user_id).await? {
            return Err(AppError::NotFound("Not following".to_string()));
        }

        self.follow_repo.delete_by_pair(caller, target_user_id).await?;
        self.profile_repo.decrement_following_count(caller).await?;
        self.profile_repo
            .decrement_followers_count(target_user_id)
            .await?;

        tracing::debug!(follower = %caller, target = %target_user_id, "Follow removed");
        Ok(())
    }

    /// Profiles following the given user, newest followers first.
    pub async fn followers(
        &self,
        caller: Option<&str>,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<EnrichedProfile>> {
        let edges = self.follow_repo.find_followers(user_id, limit, None).await?;
        let ids: Vec<String> = edges.iter().map(|e| e.follower_id.clone()).collect();
        let profiles = self.in_edge_order(&ids).await?;
        self.profiles.enrich_many(caller, profiles).await
    }

    /// Profiles the given user follows, most recently followed first.
    pub async fn following(
        &self,
        caller: Option<&str>,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<EnrichedProfile>> {
        let edges = self.follow_repo.find_following(user_id, limit, None).await?;
        let ids: Vec<String> = edges.iter().map(|e| e.following_id.clone()).collect();
        let profiles = self.in_edge_order(&ids).await?;
        self.profiles.enrich_many(caller, profiles).await
    }

    /// Load profiles for the given user IDs, preserving the ID order.
    ///
    /// IDs without a matching profile are dropped.
    async fn in_edge_order(&self, user_ids: &[String]) -> AppResult<Vec<profile::Model>> {
        let mut by_user: HashMap<String, profile::Model> = self
            .profile_repo
            .find_by_user_ids(user_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();

        Ok(user_ids
            .iter()
            .filter_map(|id| by_user.remove(id))
            .collect())
    }
}
