//! Engagement endpoints: likes, reposts, and bookmarks.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chirp_common::{AppResult, Page};
use serde::Deserialize;
use tracing::info;

use crate::{
    extractors::{Caller, MaybeCaller},
    response::ApiResponse,
    state::AppState,
};

use super::posts::PostResponse;

/// Engagement routes, merged into the posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{post_id}/like", post(like).delete(unlike))
        .route("/{post_id}/repost", post(repost))
        .route("/{post_id}/bookmark", post(bookmark).delete(unbookmark))
}

/// Create bookmarks router.
pub fn bookmarks_router() -> Router<AppState> {
    Router::new().route("/", get(list_bookmarks))
}

/// Like a post.
async fn like(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.engagement_service.like(&caller, &post_id).await?;
    info!(user_id = %caller, post_id = %post_id, "Post liked");
    Ok(ApiResponse::ok(()))
}

/// Remove a like.
async fn unlike(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.engagement_service.unlike(&caller, &post_id).await?;
    info!(user_id = %caller, post_id = %post_id, "Post unliked");
    Ok(ApiResponse::ok(()))
}

/// Repost a post. Reposts are permanent; there is no inverse route.
async fn repost(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.engagement_service.repost(&caller, &post_id).await?;
    info!(user_id = %caller, post_id = %post_id, "Post reposted");
    Ok(ApiResponse::ok(()))
}

/// Bookmark a post.
async fn bookmark(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.engagement_service.bookmark(&caller, &post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Remove a bookmark.
async fn unbookmark(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .engagement_service
        .unbookmark(&caller, &post_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Bookmark listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

const fn max_limit() -> u64 {
    100
}

/// The caller's bookmarks. Anonymous viewers get an empty page.
async fn list_bookmarks(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let Some(caller) = caller else {
        return Ok(ApiResponse::ok(Page::empty()));
    };

    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .bookmarks(&caller, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}
