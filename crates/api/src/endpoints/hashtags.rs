//! Hashtag endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use chirp_common::AppResult;
use chirp_core::TrendingHashtag;
use serde::{Deserialize, Serialize};

use crate::{response::ApiResponse, state::AppState};

/// Create hashtags router.
pub fn router() -> Router<AppState> {
    Router::new().route("/trending", get(trending))
}

/// Trending hashtag response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingHashtagResponse {
    pub tag: String,
    pub count: u64,
    pub display_count: String,
}

impl From<TrendingHashtag> for TrendingHashtagResponse {
    fn from(entry: TrendingHashtag) -> Self {
        Self {
            tag: entry.tag,
            count: entry.count,
            display_count: entry.display_count,
        }
    }
}

/// Trending query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingQuery {
    pub limit: Option<u64>,
}

const fn max_limit() -> u64 {
    100
}

/// Hashtags ranked by usage across recent posts.
async fn trending(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<ApiResponse<Vec<TrendingHashtagResponse>>> {
    let limit = query.limit.map(|limit| limit.clamp(1, max_limit()));
    let tags = state.post_service.trending_hashtags(limit).await?;
    Ok(ApiResponse::ok(tags.into_iter().map(Into::into).collect()))
}
