//! Per-user content endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chirp_common::{AppResult, Page};
use serde::Deserialize;

use crate::{extractors::MaybeCaller, response::ApiResponse, state::AppState};

use super::posts::PostResponse;
use super::profiles::ProfileResponse;

/// Create users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/posts", get(user_posts))
        .route("/{user_id}/replies", get(user_replies))
        .route("/{user_id}/likes", get(liked_posts))
        .route("/{user_id}/followers", get(followers))
        .route("/{user_id}/following", get(following))
}

/// Listing query.
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

/// Top-level posts authored by a user.
async fn user_posts(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .user_posts(caller.as_deref(), &user_id, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Replies authored by a user, each with its parent post.
async fn user_replies(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .user_replies(caller.as_deref(), &user_id, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Posts a user has liked, most recent like first.
async fn liked_posts(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .post_service
        .liked_posts(caller.as_deref(), &user_id, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Followers query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Profiles following a user.
async fn followers(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FollowListQuery>,
) -> AppResult<ApiResponse<Vec<ProfileResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let profiles = state
        .follow_service
        .followers(caller.as_deref(), &user_id, limit)
        .await?;
    Ok(ApiResponse::ok(
        profiles.into_iter().map(Into::into).collect(),
    ))
}

/// Profiles a user follows.
async fn following(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FollowListQuery>,
) -> AppResult<ApiResponse<Vec<ProfileResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let profiles = state
        .follow_service
        .following(caller.as_deref(), &user_id, limit)
        .await?;
    Ok(ApiResponse::ok(
        profiles.into_iter().map(Into::into).collect(),
    ))
}
