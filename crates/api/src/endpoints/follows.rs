//! Follow endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use chirp_common::AppResult;
use tracing::info;

use crate::{extractors::Caller, response::ApiResponse, state::AppState};

/// Create follows router.
pub fn router() -> Router<AppState> {
    Router::new().route("/{user_id}", post(follow).delete(unfollow))
}

/// Follow a user.
async fn follow(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.follow(&caller, &user_id).await?;
    info!(follower = %caller, target = %user_id, "Followed");
    Ok(ApiResponse::ok(()))
}

/// Unfollow a user.
async fn unfollow(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.unfollow(&caller, &user_id).await?;
    info!(follower = %caller, target = %user_id, "Unfollowed");
    Ok(ApiResponse::ok(()))
}
