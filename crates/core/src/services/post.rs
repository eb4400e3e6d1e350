//! Post service.

use std::collections::{HashMap, HashSet};

use chirp_common::{AppError, AppResult, Config, IdGenerator, Page};
use chirp_db::{
    entities::{post, profile},
    repositories::{
        BookmarkRepository, FollowRepository, PostLikeRepository, PostRepository,
        ProfileRepository, RepostRepository,
    },
};
use chrono::{Duration, Utc};
use regex::Regex;
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::services::media::MediaService;
use crate::services::notification::NotificationService;
use crate::services::profile::ProfileCard;

/// Maximum post length in characters, applied after trimming.
const MAX_POST_LENGTH: usize = 280;

/// Window for the trending post feed.
const TRENDING_WINDOW_HOURS: i64 = 48;

/// Window for trending hashtag extraction.
const TRENDING_HASHTAG_WINDOW_HOURS: i64 = 24;

/// How many recent posts the hashtag counter samples.
const TRENDING_HASHTAG_SAMPLE: u64 = 500;

/// Default number of trending hashtags returned.
const DEFAULT_TRENDING_HASHTAG_LIMIT: u64 = 10;

// Regex patterns - these are valid static patterns that cannot fail
#[allow(clippy::unwrap_used)]
static MENTION_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"@(\w+)").unwrap());

#[allow(clippy::unwrap_used)]
static HASHTAG_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    /// Post text.
    pub content: String,

    /// URLs of attached media, already uploaded. At most four.
    #[validate(length(max = 4))]
    pub media_urls: Option<Vec<String>>,

    /// Post being replied to.
    pub reply_to_id: Option<String>,

    /// Post being quoted.
    pub quoted_post_id: Option<String>,
}

/// Post with author, context posts, and viewer interaction state.
///
/// Context posts (`parent_post`, `quoted_post`) are one level deep: they
/// carry their author but no further nesting and no viewer flags.
pub struct EnrichedPost {
    /// The underlying post row.
    pub post: post::Model,
    /// The post's author. Absent if the profile has been deleted.
    pub author: Option<ProfileCard>,
    /// Parent post when this is a reply, populated in detail views.
    pub parent_post: Option<Box<EnrichedPost>>,
    /// Quoted post, populated wherever the post appears.
    pub quoted_post: Option<Box<EnrichedPost>>,
    /// Whether the viewer has liked this post.
    pub liked: bool,
    /// Whether the viewer has reposted this post.
    pub reposted: bool,
    /// Whether the viewer has bookmarked this post.
    pub bookmarked: bool,
    /// When the like edge was created, stamped in liked-post listings.
    pub liked_at: Option<DateTimeWithTimeZone>,
    /// When the bookmark edge was created, stamped in bookmark listings.
    pub bookmarked_at: Option<DateTimeWithTimeZone>,
}

/// A hashtag with its recent usage count.
pub struct TrendingHashtag {
    /// The hashtag, without the `#`.
    pub tag: String,
    /// Number of recent posts using it.
    pub count: u64,
    /// Compact display form of the count, `1.2K` style above 999.
    pub display_count: String,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    profile_repo: ProfileRepository,
    follow_repo: FollowRepository,
    like_repo: PostLikeRepository,
    repost_repo: RepostRepository,
    bookmark_repo: BookmarkRepository,
    notifications: NotificationService,
    media: MediaService,
    id_gen: IdGenerator,
    delete_removes_bookmarks: bool,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        post_repo: PostRepository,
        profile_repo: ProfileRepository,
        follow_repo: FollowRepository,
        like_repo: PostLikeRepository,
        repost_repo: RepostRepository,
        bookmark_repo: BookmarkRepository,
        notifications: NotificationService,
        media: MediaService,
        config: &Config,
    ) -> Self {
        Self {
            post_repo,
            profile_repo,
            follow_repo,
            like_repo,
            repost_repo,
            bookmark_repo,
            notifications,
            media,
            id_gen: IdGenerator::new(),
            delete_removes_bookmarks: config.content.delete_removes_bookmarks,
        }
    }

    /// Create a post.
    ///
    /// Mentions and hashtags are extracted from the content and stored on
    /// the row. Replying bumps the parent's reply counter and notifies its
    /// author; quoting notifies the quoted author; each distinct mentioned
    /// user with a profile gets a mention notification.
    pub async fn create(&self, caller: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidArgument(
                "Post content cannot be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_POST_LENGTH {
            return Err(AppError::InvalidArgument(format!(
                "Post content cannot exceed {MAX_POST_LENGTH} characters"
            )));
        }

        let parent = match &input.reply_to_id {
            Some(reply_to_id) => Some(self.post_repo.get_by_id(reply_to_id).await?),
            None => None,
        };
        let quoted = match &input.quoted_post_id {
            Some(quoted_post_id) => Some(self.post_repo.get_by_id(quoted_post_id).await?),
            None => None,
        };

        let mentions = extract_mentions(content);
        let hashtags = extract_hashtags(content);

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(caller.to_string()),
            content: Set(content.to_string()),
            media_urls: Set(input.media_urls.map(|urls| json!(urls))),
            reply_to_id: Set(input.reply_to_id),
            quoted_post_id: Set(input.quoted_post_id),
            mentions: Set(json!(mentions)),
            hashtags: Set(json!(hashtags)),
            likes_count: Set(0),
            reposts_count: Set(0),
            replies_count: Set(0),
            views_count: Set(0),
            created_at: Set(Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;

        self.profile_repo.increment_posts_count(caller).await?;

        if let Some(parent) = &parent {
            self.post_repo.increment_replies_count(&parent.id).await?;
            self.notifications
                .notify_reply(&parent.author_id, caller, &post.id)
                .await?;
        }

        if let Some(quoted) = &quoted {
            self.notifications
                .notify_quote(&quoted.author_id, caller, &post.id)
                .await?;
        }

        self.notify_mentions(&mentions, caller, &post.id).await?;

        tracing::debug!(post_id = %post.id, author = %caller, "Post created");
        Ok(post)
    }

    /// Delete a post.
    ///
    /// Like and repost rows go with the post. Replies and quotes keep a
    /// dangling reference that readers tolerate; bookmarks survive unless
    /// the deployment opts into scrubbing them.
    pub async fn delete(&self, caller: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != caller {
            return Err(AppError::Forbidden(
                "Cannot delete another user's post".to_string(),
            ));
        }

        if self.delete_removes_bookmarks {
            let removed = self.bookmark_repo.delete_by_post(post_id).await?;
            if removed > 0 {
                tracing::debug!(post_id = %post_id, removed, "Scrubbed bookmarks of deleted post");
            }
        }

        self.post_repo.delete(post_id).await?;
        self.profile_repo.decrement_posts_count(caller).await?;

        tracing::debug!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Get a post with full context, counting the view.
    pub async fn get_by_id(&self, caller: Option<&str>, post_id: &str) -> AppResult<EnrichedPost> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let _ = self.post_repo.increment_views_count(post_id).await;

        let mut enriched = self.enrich_posts(caller, vec![post], true).await?;
        enriched
            .pop()
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))
    }

    /// Top-level posts authored by a user, newest first.
    pub async fn user_posts(
        &self,
        caller: Option<&str>,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let rows = self
            .post_repo
            .find_by_author(user_id, limit + 1, until_id)
            .await?;
        self.paginate_and_enrich(caller, rows, limit, false).await
    }

    /// Replies authored by a user, each with its parent post.
    pub async fn user_replies(
        &self,
        caller: Option<&str>,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let rows = self
            .post_repo
            .find_replies_by_author(user_id, limit + 1, until_id)
            .await?;
        self.paginate_and_enrich(caller, rows, limit, true).await
    }

    /// Replies to a post, oldest first.
    pub async fn replies(
        &self,
        caller: Option<&str>,
        post_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let rows = self
            .post_repo
            .find_replies(post_id, limit + 1, since_id)
            .await?;
        self.paginate_and_enrich(caller, rows, limit, false).await
    }

    /// Home feed: posts by the caller and followed authors, newest first.
    ///
    /// Anonymous callers get the global stream.
    pub async fn feed(
        &self,
        caller: Option<&str>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let rows = match caller {
            Some(caller_id) => {
                let mut author_ids = self.follow_repo.find_following_ids(caller_id).await?;
                author_ids.push(caller_id.to_string());
                self.post_repo
                    .find_feed(&author_ids, limit + 1, until_id)
                    .await?
            }
            None => self.post_repo.find_global(limit + 1, until_id).await?,
        };
        self.paginate_and_enrich(caller, rows, limit, false).await
    }

    /// Search posts by content.
    pub async fn search(
        &self,
        caller: Option<&str>,
        term: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Page::empty());
        }

        let rows = self.post_repo.search(term, limit + 1, until_id).await?;
        self.paginate_and_enrich(caller, rows, limit, false).await
    }

    /// Posts a user has liked, most recent like first.
    ///
    /// Paginated over the like edges; the cursor is an edge ID.
    pub async fn liked_posts(
        &self,
        caller: Option<&str>,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let edges = self
            .like_repo
            .find_by_user(user_id, limit + 1, until_id)
            .await?;
        let page = Page::from_overfetch(edges, limit, |e| e.id.clone());

        let stamped = self
            .enrich_edge_posts(caller, &page.items, |e| (e.post_id.clone(), e.created_at))
            .await?;
        let items = stamped
            .into_iter()
            .map(|(mut post, stamp)| {
                post.liked_at = Some(stamp);
                post
            })
            .collect();

        Ok(Page {
            items,
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        })
    }

    /// The caller's bookmarks, most recent first.
    pub async fn bookmarks(
        &self,
        caller: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedPost>> {
        let edges = self
            .bookmark_repo
            .find_by_user(caller, limit + 1, until_id)
            .await?;
        let page = Page::from_overfetch(edges, limit, |e| e.id.clone());

        let stamped = self
            .enrich_edge_posts(Some(caller), &page.items, |e| {
                (e.post_id.clone(), e.created_at)
            })
            .await?;
        let items = stamped
            .into_iter()
            .map(|(mut post, stamp)| {
                post.bookmarked_at = Some(stamp);
                post
            })
            .collect();

        Ok(Page {
            items,
            next_cursor: page.next_cursor,
            has_more: page.has_more,
        })
    }

    /// Trending posts: recent posts ranked by engagement.
    pub async fn trending(&self, caller: Option<&str>, limit: u64) -> AppResult<Vec<EnrichedPost>> {
        let rows = self
            .post_repo
            .find_trending(limit, TRENDING_WINDOW_HOURS)
            .await?;
        self.enrich_posts(caller, rows, false).await
    }

    /// Most used hashtags over the last day.
    pub async fn trending_hashtags(&self, limit: Option<u64>) -> AppResult<Vec<TrendingHashtag>> {
        let limit = limit.unwrap_or(DEFAULT_TRENDING_HASHTAG_LIMIT);
        let since = Utc::now() - Duration::hours(TRENDING_HASHTAG_WINDOW_HOURS);
        let posts = self
            .post_repo
            .find_created_since(since, TRENDING_HASHTAG_SAMPLE)
            .await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for post in &posts {
            if let Some(tags) = post.hashtags.as_array() {
                for tag in tags {
                    if let Some(tag) = tag.as_str() {
                        *counts.entry(tag.to_string()).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit as usize);

        Ok(ranked
            .into_iter()
            .map(|(tag, count)| TrendingHashtag {
                display_count: format_count(count),
                tag,
                count,
            })
            .collect())
    }

    /// Attach authors, context posts, and viewer flags to a batch of posts.
    ///
    /// One query per relation: context posts, author profiles, and the
    /// three viewer edge sets are each loaded for the whole batch at once.
    /// `with_context` controls whether reply parents are loaded; quoted
    /// posts always are.
    pub async fn enrich_posts(
        &self,
        caller: Option<&str>,
        posts: Vec<post::Model>,
        with_context: bool,
    ) -> AppResult<Vec<EnrichedPost>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let mut context_ids: Vec<String> = Vec::new();
        for post in &posts {
            if with_context && let Some(id) = &post.reply_to_id {
                context_ids.push(id.clone());
            }
            if let Some(id) = &post.quoted_post_id {
                context_ids.push(id.clone());
            }
        }
        context_ids.sort();
        context_ids.dedup();
        let context_posts = self.post_repo.find_by_ids(&context_ids).await?;

        let mut author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        author_ids.extend(context_posts.iter().map(|p| p.author_id.clone()));
        author_ids.sort();
        author_ids.dedup();
        let profiles = self.profile_repo.find_by_user_ids(&author_ids).await?;
        let profile_map: HashMap<String, profile::Model> = profiles
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();

        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let (liked, reposted, bookmarked) = match caller {
            Some(caller_id) => (
                to_set(self.like_repo.find_liked_post_ids(caller_id, &post_ids).await?),
                to_set(
                    self.repost_repo
                        .find_reposted_post_ids(caller_id, &post_ids)
                        .await?,
                ),
                to_set(
                    self.bookmark_repo
                        .find_bookmarked_post_ids(caller_id, &post_ids)
                        .await?,
                ),
            ),
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        let context_map: HashMap<String, post::Model> = context_posts
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = profile_map
                    .get(&post.author_id)
                    .map(|p| ProfileCard::from_profile(p, &self.media));
                let parent_post = if with_context {
                    post.reply_to_id
                        .as_ref()
                        .and_then(|id| context_map.get(id))
                        .map(|p| Box::new(self.context_post(p.clone(), &profile_map)))
                } else {
                    None
                };
                let quoted_post = post
                    .quoted_post_id
                    .as_ref()
                    .and_then(|id| context_map.get(id))
                    .map(|p| Box::new(self.context_post(p.clone(), &profile_map)));

                EnrichedPost {
                    liked: liked.contains(&post.id),
                    reposted: reposted.contains(&post.id),
                    bookmarked: bookmarked.contains(&post.id),
                    author,
                    parent_post,
                    quoted_post,
                    liked_at: None,
                    bookmarked_at: None,
                    post,
                }
            })
            .collect())
    }

    /// Resolve edge rows to enriched posts, preserving edge order.
    ///
    /// Edges whose post has vanished are skipped, so the result can be
    /// shorter than the input.
    async fn enrich_edge_posts<E>(
        &self,
        caller: Option<&str>,
        edges: &[E],
        key: impl Fn(&E) -> (String, DateTimeWithTimeZone),
    ) -> AppResult<Vec<(EnrichedPost, DateTimeWithTimeZone)>> {
        let keys: Vec<(String, DateTimeWithTimeZone)> = edges.iter().map(key).collect();
        let post_ids: Vec<String> = keys.iter().map(|(id, _)| id.clone()).collect();

        let mut post_map: HashMap<String, post::Model> = self
            .post_repo
            .find_by_ids(&post_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut ordered = Vec::with_capacity(keys.len());
        let mut stamps = Vec::with_capacity(keys.len());
        for (post_id, stamp) in keys {
            if let Some(post) = post_map.remove(&post_id) {
                ordered.push(post);
                stamps.push(stamp);
            }
        }

        let enriched = self.enrich_posts(caller, ordered, false).await?;
        Ok(enriched.into_iter().zip(stamps).collect())
    }

    fn context_post(
        &self,
        post: post::Model,
        profiles: &HashMap<String, profile::Model>,
    ) -> EnrichedPost {
        let author = profiles
            .get(&post.author_id)
            .map(|p| ProfileCard::from_profile(p, &self.media));
        EnrichedPost {
            post,
            author,
            parent_post: None,
            quoted_post: None,
            liked: false,
            reposted: false,
            bookmarked: false,
            liked_at: None,
            bookmarked_at: None,
        }
    }

    async fn paginate_and_enrich(
        &self,
        caller: Option<&str>,
        rows: Vec<post::Model>,
        limit: u64,
        with_context: bool,
    ) -> AppResult<Page<EnrichedPost>> {
        let Page {
            items,
            next_cursor,
            has_more,
        } = Page::from_overfetch(rows, limit, |p| p.id.clone());
        let items = self.enrich_posts(caller, items, with_context).await?;
        Ok(Page {
            items,
            next_cursor,
            has_more,
        })
    }

    /// Notify every mentioned user that has a profile.
    async fn notify_mentions(
        &self,
        mentions: &[String],
        actor_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        if mentions.is_empty() {
            return Ok(());
        }

        let mentioned = self.profile_repo.find_by_usernames(mentions).await?;
        for profile in mentioned {
            self.notifications
                .notify_mention(&profile.user_id, actor_id, post_id)
                .await?;
        }
        Ok(())
    }
}

fn to_set(ids: Vec<String>) -> HashSet<String> {
    ids.into_iter().collect()
}

/// Extract `@mentions` from post text, lowercased and deduplicated in
/// order of first appearance.
fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions = Vec::new();
    for capture in MENTION_RE.captures_iter(text) {
        if let Some(name) = capture.get(1) {
            let name = name.as_str().to_lowercase();
            if !mentions.contains(&name) {
                mentions.push(name);
            }
        }
    }
    mentions
}

/// Extract `#hashtags` from post text, lowercased and deduplicated in
/// order of first appearance.
fn extract_hashtags(text: &str) -> Vec<String> {
    let mut hashtags = Vec::new();
    for capture in HASHTAG_RE.captures_iter(text) {
        if let Some(tag) = capture.get(1) {
            let tag = tag.as_str().to_lowercase();
            if !hashtags.contains(&tag) {
                hashtags.push(tag);
            }
        }
    }
    hashtags
}

/// Compact display form of a count, `1.2K` above 999.
fn format_count(count: u64) -> String {
    if count > 999 {
        #[allow(clippy::cast_precision_loss)]
        let thousands = count as f64 / 1000.0;
        format!("{thousands:.1}K")
    } else {
        count.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::config::{ContentConfig, DatabaseConfig, MediaConfig, ServerConfig};
    use chirp_db::repositories::NotificationRepository;
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

    fn create_test_post(id: &str, author_id: &str, content: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            media_urls: None,
            reply_to_id: None,
            quoted_post_id: None,
            mentions: json!(extract_mentions(content)),
            hashtags: json!(extract_hashtags(content)),
            likes_count: 0,
            reposts_count: 0,
            replies_count: 0,
            views_count: 0,
            created_at: Utc::now().into(),
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

    fn empty_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_service(
        post_db: Arc<sea_orm::DatabaseConnection>,
        profile_db: Arc<sea_orm::DatabaseConnection>,
    ) -> PostService {
        let media = MediaService::new(&create_test_config());
        let notifications = NotificationService::new(
            NotificationRepository::new(empty_db()),
            ProfileRepository::new(empty_db()),
            PostRepository::new(empty_db()),
            media.clone(),
        );
        PostService::new(
            PostRepository::new(post_db),
            ProfileRepository::new(profile_db),
            FollowRepository::new(empty_db()),
            PostLikeRepository::new(empty_db()),
            RepostRepository::new(empty_db()),
            BookmarkRepository::new(empty_db()),
            notifications,
            media,
            &create_test_config(),
        )
    }

    #[test]
    fn test_extract_mentions_lowercases() {
        assert_eq!(extract_mentions("hello @Bob and @ALICE"), vec!["bob", "alice"]);
    }

    #[test]
    fn test_extract_mentions_deduplicates() {
        assert_eq!(extract_mentions("@bob hi @Bob again @bob"), vec!["bob"]);
    }

    #[test]
    fn test_extract_mentions_stops_at_punctuation() {
        assert_eq!(extract_mentions("thanks @carol!"), vec!["carol"]);
    }

    #[test]
    fn test_extract_mentions_none() {
        assert!(extract_mentions("no mentions here").is_empty());
    }

    #[test]
    fn test_extract_hashtags() {
        assert_eq!(
            extract_hashtags("shipping #Rust code #opensource #rust"),
            vec!["rust", "opensource"]
        );
    }

    #[test]
    fn test_extract_both_from_mixed_content() {
        let text = "hello @B #fun";
        assert_eq!(extract_mentions(text), vec!["b"]);
        assert_eq!(extract_hashtags(text), vec!["fun"]);
    }

    #[test]
    fn test_format_count_small_values() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_format_count_thousands() {
        assert_eq!(format_count(1000), "1.0K");
        assert_eq!(format_count(1234), "1.2K");
        assert_eq!(format_count(15500), "15.5K");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let service = create_test_service(empty_db(), empty_db());

        let input = CreatePostInput {
            content: "   ".to_string(),
            media_urls: None,
            reply_to_id: None,
            quoted_post_id: None,
        };

        let result = service.create("user1", input).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_over_length_content() {
        let service = create_test_service(empty_db(), empty_db());

        let input = CreatePostInput {
            content: "a".repeat(MAX_POST_LENGTH + 1),
            media_urls: None,
            reply_to_id: None,
            quoted_post_id: None,
        };

        let result = service.create("user1", input).await;
        match result {
            Err(AppError::InvalidArgument(msg)) => assert!(msg.contains("280")),
            _ => panic!("Expected InvalidArgument error"),
        }
    }

    #[tokio::test]
    async fn test_create_accepts_max_length_content() {
        let content = "a".repeat(MAX_POST_LENGTH);
        let created = create_test_post("post1", "user1", &content);

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .into_connection(),
        );
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([sea_orm::MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = create_test_service(post_db, profile_db);

        let input = CreatePostInput {
            content,
            media_urls: None,
            reply_to_id: None,
            quoted_post_id: None,
        };

        let result = service.create("user1", input).await.unwrap();
        assert_eq!(result.id, "post1");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_parent() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(post_db, empty_db());

        let input = CreatePostInput {
            content: "replying into the void".to_string(),
            media_urls: None,
            reply_to_id: Some("ghost".to_string()),
            quoted_post_id: None,
        };

        let result = service.create("user1", input).await;
        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_delete_requires_author() {
        let post = create_test_post("post1", "user1", "mine");
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );

        let service = create_test_service(post_db, empty_db());

        let result = service.delete("intruder", "post1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = create_test_service(post_db, empty_db());

        let result = service.get_by_id(None, "missing").await;
        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_feed_anonymous_uses_global_stream() {
        let posts = vec![
            create_test_post("post2", "user1", "second"),
            create_test_post("post1", "user2", "first"),
        ];
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([posts])
                .into_connection(),
        );
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_profile("user1", "alice"),
                    create_test_profile("user2", "bob"),
                ]])
                .into_connection(),
        );

        let service = create_test_service(post_db, profile_db);

        let page = service.feed(None, 20, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
        assert_eq!(
            page.items[0].author.as_ref().unwrap().username,
            "alice"
        );
        assert!(!page.items[0].liked);
    }

    #[tokio::test]
    async fn test_feed_overfetch_produces_cursor() {
        let posts = vec![
            create_test_post("post3", "user1", "c"),
            create_test_post("post2", "user1", "b"),
            create_test_post("post1", "user1", "a"),
        ];
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([posts])
                .into_connection(),
        );
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_profile("user1", "alice")]])
                .into_connection(),
        );

        let service = create_test_service(post_db, profile_db);

        let page = service.feed(None, 2, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("post2"));
    }

    #[tokio::test]
    async fn test_search_empty_term_skips_query() {
        let service = create_test_service(empty_db(), empty_db());

        let page = service.search(None, "  ", 20, None).await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_trending_hashtags_counts_and_ranks() {
        let posts = vec![
            create_test_post("post3", "user1", "more #rust today"),
            create_test_post("post2", "user2", "#rust and #async"),
            create_test_post("post1", "user3", "plain post"),
        ];
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([posts])
                .into_connection(),
        );

        let service = create_test_service(post_db, empty_db());

        let trending = service.trending_hashtags(None).await.unwrap();
        assert_eq!(trending.len(), 2);
        assert_eq!(trending[0].tag, "rust");
        assert_eq!(trending[0].count, 2);
        assert_eq!(trending[0].display_count, "2");
        assert_eq!(trending[1].tag, "async");
    }

    #[tokio::test]
    async fn test_trending_hashtags_respects_limit() {
        let posts = vec![
            create_test_post("post2", "user1", "#one #two"),
            create_test_post("post1", "user2", "#one #three"),
        ];
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([posts])
                .into_connection(),
        );

        let service = create_test_service(post_db, empty_db());

        let trending = service.trending_hashtags(Some(1)).await.unwrap();
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].tag, "one");
    }

    #[tokio::test]
    async fn test_replies_ascending_pagination() {
        let replies = vec![
            create_test_post("r1", "user2", "first reply"),
            create_test_post("r2", "user3", "second reply"),
            create_test_post("r3", "user2", "third reply"),
        ];
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([replies])
                .into_connection(),
        );
        let profile_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_profile("user2", "bob"),
                    create_test_profile("user3", "carol"),
                ]])
                .into_connection(),
        );

        let service = create_test_service(post_db, profile_db);

        let page = service.replies(None, "post1", 2, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        // Cursor is the newest reply seen; the next page continues after it
        assert_eq!(page.next_cursor.as_deref(), Some("r2"));
    }
}
