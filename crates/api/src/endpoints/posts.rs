//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chirp_common::{AppResult, Page};
use chirp_core::{CreatePostInput, EnrichedPost};
use chirp_db::entities::post;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extractors::{Caller, MaybeCaller},
    response::ApiResponse,
    state::AppState,
};

use super::profiles::ProfileCardResponse;

/// Create posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post))
        .route("/feed", get(feed))
        .route("/trending", get(trending))
        .route("/search", get(search))
        .route("/{post_id}", get(show).delete(delete_post))
        .route("/{post_id}/replies", get(replies))
}

/// Post response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_post_id: Option<String>,
    pub hashtags: Vec<String>,
    pub likes_count: i32,
    pub reposts_count: i32,
    pub replies_count: i32,
    pub views_count: i32,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<ProfileCardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_post: Option<Box<PostResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_post: Option<Box<PostResponse>>,
    pub liked: bool,
    pub reposted: bool,
    pub bookmarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmarked_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(post: post::Model) -> Self {
        Self {
            media_urls: post.media_urls.as_ref().and_then(json_strings),
            hashtags: json_strings(&post.hashtags).unwrap_or_default(),
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            reply_to_id: post.reply_to_id,
            quoted_post_id: post.quoted_post_id,
            likes_count: post.likes_count,
            reposts_count: post.reposts_count,
            replies_count: post.replies_count,
            views_count: post.views_count,
            created_at: post.created_at.to_rfc3339(),
            author: None,
            parent_post: None,
            quoted_post: None,
            liked: false,
            reposted: false,
            bookmarked: false,
            liked_at: None,
            bookmarked_at: None,
        }
    }
}

impl From<EnrichedPost> for PostResponse {
    fn from(enriched: EnrichedPost) -> Self {
        Self {
            author: enriched.author.map(Into::into),
            parent_post: enriched.parent_post.map(|p| Box::new(Self::from(*p))),
            quoted_post: enriched.quoted_post.map(|p| Box::new(Self::from(*p))),
            liked: enriched.liked,
            reposted: enriched.reposted,
            bookmarked: enriched.bookmarked,
            liked_at: enriched.liked_at.map(|at| at.to_rfc3339()),
            bookmarked_at: enriched.bookmarked_at.map(|at| at.to_rfc3339()),
            ..Self::from(enriched.post)
        }
    }
}

/// Extract a string array from a stored JSON value.
fn json_strings(value: &serde_json::Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(ToOwned::to_owned))
            .collect()
    })
}

const fn default_limit() -> u64 {
    20
}

const fn max_limit() -> u64 {
    100
}

/// Create a post.
async fn create_post(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&caller, input).await?;
    info!(post_id = %post.id, author = %caller, "Post created");
    Ok(ApiResponse::ok(post.into()))
}

/// Get a post by ID, with parent and quoted context.
async fn show(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .get_by_id(caller.as_deref(), &post_id)
        .await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post.
async fn delete_post(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&caller, &post_id).await?;
    info!(post_id = %post_id, author = %caller, "Post deleted");
    Ok(ApiResponse::ok(()))
}

/// Feed query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Home feed for the caller; the global stream for anonymous viewers.
async fn feed(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .feed(caller.as_deref(), limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Trending query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Trending posts, ranked by recent engagement.
async fn trending(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let posts = state
        .post_service
        .trending(caller.as_deref(), limit)
        .await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Post search query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Search posts by content.
async fn search(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .search(caller.as_deref(), &query.q, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Replies query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub since_id: Option<String>,
}

/// Replies to a post, oldest first.
async fn replies(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<RepliesQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .replies(caller.as_deref(), &post_id, limit, query.since_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}
