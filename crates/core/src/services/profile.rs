//! Profile service.

use std::collections::HashSet;

use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    entities::profile,
    repositories::{FollowRepository, ProfileRepository},
};
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::media::MediaService;

/// Candidate pool for follow suggestions: the most recently created profiles.
const SUGGESTION_POOL_SIZE: u64 = 20;

/// Default number of follow suggestions returned.
const DEFAULT_SUGGESTION_LIMIT: u64 = 5;

// Regex patterns - these are valid static patterns that cannot fail
#[allow(clippy::unwrap_used)]
static USERNAME_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[a-z0-9_]{3,15}$").unwrap());

/// Compact profile projection attached to posts, notifications, and
/// conversation listings.
pub struct ProfileCard {
    /// Auth-layer user ID of the profile owner.
    pub user_id: String,
    /// Unique handle.
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Resolved avatar URL.
    pub avatar_url: Option<String>,
    /// Verification badge.
    pub verified: bool,
}

impl ProfileCard {
    /// Build a card from a profile row, resolving the avatar reference.
    #[must_use]
    pub fn from_profile(profile: &profile::Model, media: &MediaService) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            username: profile.username.clone(),
            display_name: profile.display_name.clone(),
            avatar_url: media.avatar_url(profile),
            verified: profile.verified,
        }
    }
}

/// Profile with read-time personalization for a viewing user.
pub struct EnrichedProfile {
    /// The underlying profile row.
    pub profile: profile::Model,
    /// Resolved avatar URL.
    pub avatar_url: Option<String>,
    /// Resolved banner URL.
    pub banner_url: Option<String>,
    /// Whether the viewer follows this profile. Always false for anonymous
    /// viewers and for the viewer's own profile.
    pub is_following: bool,
    /// Whether this is the viewer's own profile.
    pub is_own_profile: bool,
}

/// Input for creating or replacing the caller's profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileInput {
    /// Requested handle, normalized before validation.
    pub username: String,

    /// Display name.
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,

    /// Bio text.
    #[validate(length(max = 160))]
    pub bio: Option<String>,

    /// Free-form location.
    #[validate(length(max = 30))]
    pub location: Option<String>,

    /// Website URL.
    #[validate(length(max = 100))]
    pub website: Option<String>,

    /// Direct avatar URL.
    pub avatar_url: Option<String>,

    /// Direct banner URL.
    pub banner_url: Option<String>,

    /// Storage reference for the avatar.
    pub avatar_file_id: Option<String>,

    /// Storage reference for the banner.
    pub banner_file_id: Option<String>,
}

/// Input for partially updating the caller's profile.
///
/// Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    /// New handle.
    pub username: Option<String>,

    /// New display name.
    #[validate(length(min = 1, max = 50))]
    pub display_name: Option<String>,

    /// New bio text.
    #[validate(length(max = 160))]
    pub bio: Option<String>,

    /// New location.
    #[validate(length(max = 30))]
    pub location: Option<String>,

    /// New website URL.
    #[validate(length(max = 100))]
    pub website: Option<String>,

    /// New avatar URL.
    pub avatar_url: Option<String>,

    /// New banner URL.
    pub banner_url: Option<String>,

    /// New avatar storage reference.
    pub avatar_file_id: Option<String>,

    /// New banner storage reference.
    pub banner_file_id: Option<String>,
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    follow_repo: FollowRepository,
    media: MediaService,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        profile_repo: ProfileRepository,
        follow_repo: FollowRepository,
        media: MediaService,
    ) -> Self {
        Self {
            profile_repo,
            follow_repo,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// First-sign-in hook: ensure a profile exists for an auth user.
    ///
    /// A username is derived from the email local part and de-duplicated
    /// with an integer suffix. Returns the existing profile unchanged when
    /// the user is already provisioned.
    pub async fn provision(
        &self,
        user_id: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> AppResult<profile::Model> {
        if let Some(existing) = self.profile_repo.find_by_user_id(user_id).await? {
            return Ok(existing);
        }

        let base = username_from_email(email);
        let username = self.dedupe_username(&base).await?;
        let display_name = display_name.map_or_else(
            || email.split('@').next().unwrap_or(email).to_string(),
            ToString::to_string,
        );

        let model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            username: Set(username),
            display_name: Set(display_name),
            bio: Set(None),
            location: Set(None),
            website: Set(None),
            avatar_url: Set(None),
            banner_url: Set(None),
            avatar_file_id: Set(None),
            banner_file_id: Set(None),
            verified: Set(false),
            followers_count: Set(0),
            following_count: Set(0),
            posts_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
        };

        let profile = self.profile_repo.create(model).await?;
        tracing::debug!(user_id = %user_id, username = %profile.username, "Profile provisioned");
        Ok(profile)
    }

    /// Create the caller's profile, or overwrite it if one exists.
    pub async fn create_or_update(
        &self,
        user_id: &str,
        input: CreateProfileInput,
    ) -> AppResult<profile::Model> {
        input.validate()?;

        let username = normalize_username(&input.username);
        validate_username(&username)?;
        self.ensure_username_free(&username, user_id).await?;

        match self.profile_repo.find_by_user_id(user_id).await? {
            Some(profile) => {
                let mut active: profile::ActiveModel = profile.into();
                active.username = Set(username);
                active.display_name = Set(input.display_name);
                active.bio = Set(input.bio);
                active.location = Set(input.location);
                active.website = Set(input.website);
                active.avatar_url = Set(input.avatar_url);
                active.banner_url = Set(input.banner_url);
                active.avatar_file_id = Set(input.avatar_file_id);
                active.banner_file_id = Set(input.banner_file_id);
                self.profile_repo.update(active).await
            }
            None => {
                let model = profile::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    username: Set(username),
                    display_name: Set(input.display_name),
                    bio: Set(input.bio),
                    location: Set(input.location),
                    website: Set(input.website),
                    avatar_url: Set(input.avatar_url),
                    banner_url: Set(input.banner_url),
                    avatar_file_id: Set(input.avatar_file_id),
                    banner_file_id: Set(input.banner_file_id),
                    verified: Set(false),
                    followers_count: Set(0),
                    following_count: Set(0),
                    posts_count: Set(0),
                    created_at: Set(chrono::Utc::now().into()),
                };
                self.profile_repo.create(model).await
            }
        }
    }

    /// Partially update the caller's profile.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<profile::Model> {
        input.validate()?;

        let profile = self.profile_repo.get_by_user_id(user_id).await?;
        let current_username = profile.username.clone();
        let mut active: profile::ActiveModel = profile.into();

        if let Some(username) = input.username {
            let username = normalize_username(&username);
            validate_username(&username)?;
            if username != current_username {
                self.ensure_username_free(&username, user_id).await?;
                active.username = Set(username);
            }
        }
        if let Some(display_name) = input.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(website) = input.website {
            active.website = Set(Some(website));
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        if let Some(banner_url) = input.banner_url {
            active.banner_url = Set(Some(banner_url));
        }
        if let Some(avatar_file_id) = input.avatar_file_id {
            active.avatar_file_id = Set(Some(avatar_file_id));
        }
        if let Some(banner_file_id) = input.banner_file_id {
            active.banner_file_id = Set(Some(banner_file_id));
        }

        self.profile_repo.update(active).await
    }

    /// Get a profile by username with viewer personalization.
    pub async fn get_by_username(
        &self,
        caller: Option<&str>,
        username: &str,
    ) -> AppResult<EnrichedProfile> {
        let profile = self.profile_repo.get_by_username(username).await?;
        self.enrich(caller, profile).await
    }

    /// The caller's own profile.
    pub async fn get_current(&self, caller: &str) -> AppResult<EnrichedProfile> {
        let profile = self.profile_repo.get_by_user_id(caller).await?;
        Ok(self.build(profile, false, true))
    }

    /// Search profiles by username or display name.
    pub async fn search(
        &self,
        caller: Option<&str>,
        term: &str,
        limit: u64,
    ) -> AppResult<Vec<EnrichedProfile>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(vec![]);
        }

        let profiles = self.profile_repo.search(term, limit).await?;
        self.enrich_many(caller, profiles).await
    }

    /// Suggest profiles to follow.
    ///
    /// Candidates are the most recently created profiles, minus the caller
    /// and anyone already followed, ranked by follower count.
    pub async fn suggested(
        &self,
        caller: Option<&str>,
        limit: Option<u64>,
    ) -> AppResult<Vec<EnrichedProfile>> {
        let limit = limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);
        let mut candidates = self.profile_repo.find_recent(SUGGESTION_POOL_SIZE).await?;

        if let Some(caller_id) = caller {
            let followed: HashSet<String> = self
                .follow_repo
                .find_following_ids(caller_id)
                .await?
                .into_iter()
                .collect();
            candidates.retain(|p| p.user_id != caller_id && !followed.contains(&p.user_id));
        }

        candidates.sort_by(|a, b| b.followers_count.cmp(&a.followers_count));
        candidates.truncate(limit as usize);

        // Already-followed profiles were filtered out above
        Ok(candidates
            .into_iter()
            .map(|p| self.build(p, false, false))
            .collect())
    }

    /// Enrich one profile relative to a viewer.
    pub async fn enrich(
        &self,
        caller: Option<&str>,
        profile: profile::Model,
    ) -> AppResult<EnrichedProfile> {
        let is_own_profile = caller == Some(profile.user_id.as_str());
        let is_following = match caller {
            Some(caller_id) if !is_own_profile => {
                self.follow_repo
                    .is_following(caller_id, &profile.user_id)
                    .await?
            }
            _ => false,
        };
        Ok(self.build(profile, is_following, is_own_profile))
    }

    /// Enrich a batch of profiles against one viewer.
    ///
    /// The viewer's followed set is loaded once for the whole batch.
    pub async fn enrich_many(
        &self,
        caller: Option<&str>,
        profiles: Vec<profile::Model>,
    ) -> AppResult<Vec<EnrichedProfile>> {
        let followed: HashSet<String> = match caller {
            Some(caller_id) => self
                .follow_repo
                .find_following_ids(caller_id)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(profiles
            .into_iter()
            .map(|p| {
                let is_own_profile = caller == Some(p.user_id.as_str());
                let is_following = followed.contains(&p.user_id);
                self.build(p, is_following, is_own_profile)
            })
            .collect())
    }

    /// A card for the given profile row.
    #[must_use]
    pub fn card(&self, profile: &profile::Model) -> ProfileCard {
        ProfileCard::from_profile(profile, &self.media)
    }

    fn build(
        &self,
        profile: profile::Model,
        is_following: bool,
        is_own_profile: bool,
    ) -> EnrichedProfile {
        let avatar_url = self.media.avatar_url(&profile);
        let banner_url = self.media.banner_url(&profile);
        EnrichedProfile {
            profile,
            avatar_url,
            banner_url,
            is_following,
            is_own_profile,
        }
    }

    async fn ensure_username_free(&self, username: &str, user_id: &str) -> AppResult<()> {
        if let Some(existing) = self.profile_repo.find_by_username(username).await?
            && existing.user_id != user_id
        {
            return Err(AppError::Conflict(format!(
                "Username already taken: {username}"
            )));
        }
        Ok(())
    }

    async fn dedupe_username(&self, base: &str) -> AppResult<String> {
        if self.profile_repo.find_by_username(base).await?.is_none() {
            return Ok(base.to_string());
        }

        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}{suffix}");
            if self
                .profile_repo
                .find_by_username(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

/// Lowercase and trim a requested username.
fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Validate a normalized username against the handle format.
fn validate_username(username: &str) -> AppResult<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::InvalidArgument(
            "Username must be 3-15 characters of lowercase letters, digits, and underscores"
                .to_string(),
        ))
    }
}

/// Derive a base username from an email address.
fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let mut base: String = local
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    base.truncate(15);
    if base.len() < 3 {
        base = format!("user{base}");
    }
    base
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::Config;
    use chirp_common::config::{ContentConfig, DatabaseConfig, MediaConfig, ServerConfig};
    use chrono::Utc;
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

    fn create_test_profile(user_id: &str, username: &str) -> profile::Model {
        profile::Model {
            id: format!("id_{username}"),
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

    fn create_test_service(
        profile_db: Arc<sea_orm::DatabaseConnection>,
        follow_db: Arc<sea_orm::DatabaseConnection>,
    ) -> ProfileService {
        let profile_repo = ProfileRepository::new(profile_db);
        let follow_repo = FollowRepository::new(follow_db);
        let media = MediaService::new(&create_test_config());
        ProfileService::new(profile_repo, follow_repo, media)
    }

    #[test]
    fn test_validate_username_accepts_valid_handles() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("abc_123").is_ok());
        assert!(validate_username("a_b_c_d_e_f_g_h").is_ok());
    }

    #[test]
    fn test_validate_username_rejects_too_short() {
        let result = validate_username("ab");
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_username_rejects_too_long() {
        let result = validate_username(&"a".repeat(16));
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_username_rejects_bad_characters() {
        assert!(validate_username("abc-123").is_err());
        assert!(validate_username("abc.123").is_err());
        assert!(validate_username("Abc").is_err());
    }

    #[test]
    fn test_normalize_username_lowercases_and_trims() {
        assert_eq!(normalize_username("  Abc_123 "), "abc_123");
        assert!(validate_username(&normalize_username("Abc_123")).is_ok());
    }

    #[test]
    fn test_username_from_email_strips_symbols() {
        assert_eq!(username_from_email("John.Doe+spam@example.com"), "johndoespam");
    }

    #[test]
    fn test_username_from_email_truncates() {
        assert_eq!(
            username_from_email("averyverylongaddress@example.com"),
            "averyverylongad"
        );
    }

    #[test]
    fn test_username_from_email_pads_short_locals() {
        assert_eq!(username_from_email("ab@example.com"), "userab");
        assert_eq!(username_from_email("@example.com"), "user");
    }

    #[tokio::test]
    async fn test_get_by_username_not_found() {
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let result = service.get_by_username(None, "nobody").await;
        match result {
            Err(AppError::ProfileNotFound(name)) => assert_eq!(name, "nobody"),
            _ => panic!("Expected ProfileNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_get_current_marks_own_profile() {
        let profile = create_test_profile("user1", "alice");
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile]])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let result = service.get_current("user1").await.unwrap();
        assert!(result.is_own_profile);
        assert!(!result.is_following);
    }

    #[tokio::test]
    async fn test_create_or_update_rejects_invalid_username() {
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let input = CreateProfileInput {
            username: "a!".to_string(),
            display_name: "Alice".to_string(),
            bio: None,
            location: None,
            website: None,
            avatar_url: None,
            banner_url: None,
            avatar_file_id: None,
            banner_file_id: None,
        };

        let result = service.create_or_update("user1", input).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_create_or_update_rejects_taken_username() {
        let other = create_test_profile("user2", "alice");
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[other]])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let input = CreateProfileInput {
            username: "Alice".to_string(),
            display_name: "Alice".to_string(),
            bio: None,
            location: None,
            website: None,
            avatar_url: None,
            banner_url: None,
            avatar_file_id: None,
            banner_file_id: None,
        };

        let result = service.create_or_update("user1", input).await;
        match result {
            Err(AppError::Conflict(msg)) => assert!(msg.contains("alice")),
            _ => panic!("Expected Conflict error"),
        }
    }

    #[tokio::test]
    async fn test_update_without_profile_fails() {
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let input = UpdateProfileInput {
            display_name: Some("New Name".to_string()),
            ..Default::default()
        };

        let result = service.update("user1", input).await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_provision_returns_existing_profile() {
        let existing = create_test_profile("user1", "alice");
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let result = service
            .provision("user1", "alice@example.com", None)
            .await
            .unwrap();
        assert_eq!(result.username, "alice");
    }

    #[tokio::test]
    async fn test_search_empty_term_skips_query() {
        let profile_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let result = service.search(None, "   ", 10).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_suggested_ranks_by_follower_count() {
        let mut low = create_test_profile("user2", "bob");
        low.followers_count = 3;
        let mut high = create_test_profile("user3", "carol");
        high.followers_count = 50;

        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![low, high]])
                .into_connection(),
        );
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(profile_db, follow_db);

        let result = service.suggested(None, Some(5)).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].profile.username, "carol");
        assert_eq!(result[1].profile.username, "bob");
    }
}
