//! Media URL resolution.

use chirp_common::Config;
use chirp_db::entities::profile;

/// Resolves stored file references to public URLs.
///
/// Uploaded files live in an external object store and are referenced by
/// opaque file IDs. The public URL is computed at read time as
/// `{base_url}/{file_id}`, so the store can move without a data migration.
/// Rows written before the store existed carry a full URL instead of a file
/// ID and are passed through unchanged.
#[derive(Clone)]
pub struct MediaService {
    base_url: Option<String>,
}

impl MediaService {
    /// Create a new media service from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.media.base_url.clone(),
        }
    }

    /// Public URL for a stored file ID, if a store is configured.
    #[must_use]
    pub fn file_url(&self, file_id: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), file_id))
    }

    /// Resolved avatar URL for a profile.
    ///
    /// Prefers the storage reference, falls back to the stored URL.
    #[must_use]
    pub fn avatar_url(&self, profile: &profile::Model) -> Option<String> {
        profile
            .avatar_file_id
            .as_deref()
            .and_then(|id| self.file_url(id))
            .or_else(|| profile.avatar_url.clone())
    }

    /// Resolved banner URL for a profile.
    #[must_use]
    pub fn banner_url(&self, profile: &profile::Model) -> Option<String> {
        profile
            .banner_file_id
            .as_deref()
            .and_then(|id| self.file_url(id))
            .or_else(|| profile.banner_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_common::config::{ContentConfig, DatabaseConfig, MediaConfig, ServerConfig};
    use chrono::Utc;

    fn create_test_config(base_url: Option<&str>) -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            media: MediaConfig {
                base_url: base_url.map(ToString::to_string),
            },
            content: ContentConfig::default(),
        }
    }

    fn create_test_profile() -> profile::Model {
        profile::Model {
            id: "p1".to_string(),
            user_id: "user1".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
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

    #[test]
    fn test_file_url_joins_base_and_id() {
        let service = MediaService::new(&create_test_config(Some("https://cdn.example.com")));

        assert_eq!(
            service.file_url("abc123").as_deref(),
            Some("https://cdn.example.com/abc123")
        );
    }

    #[test]
    fn test_file_url_strips_trailing_slash() {
        let service = MediaService::new(&create_test_config(Some("https://cdn.example.com/")));

        assert_eq!(
            service.file_url("abc123").as_deref(),
            Some("https://cdn.example.com/abc123")
        );
    }

    #[test]
    fn test_file_url_without_store() {
        let service = MediaService::new(&create_test_config(None));

        assert!(service.file_url("abc123").is_none());
    }

    #[test]
    fn test_avatar_prefers_file_id() {
        let service = MediaService::new(&create_test_config(Some("https://cdn.example.com")));
        let mut profile = create_test_profile();
        profile.avatar_file_id = Some("file1".to_string());
        profile.avatar_url = Some("https://old.example.com/a.png".to_string());

        assert_eq!(
            service.avatar_url(&profile).as_deref(),
            Some("https://cdn.example.com/file1")
        );
    }

    #[test]
    fn test_avatar_falls_back_to_stored_url() {
        let service = MediaService::new(&create_test_config(None));
        let mut profile = create_test_profile();
        profile.avatar_file_id = Some("file1".to_string());
        profile.avatar_url = Some("https://old.example.com/a.png".to_string());

        // No store configured, so the file ID cannot be resolved
        assert_eq!(
            service.avatar_url(&profile).as_deref(),
            Some("https://old.example.com/a.png")
        );
    }

    #[test]
    fn test_banner_none_when_unset() {
        let service = MediaService::new(&create_test_config(Some("https://cdn.example.com")));
        let profile = create_test_profile();

        assert!(service.banner_url(&profile).is_none());
    }
}
