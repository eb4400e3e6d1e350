//! Profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chirp_common::AppResult;
use chirp_core::{CreateProfileInput, EnrichedProfile, ProfileCard, UpdateProfileInput};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extractors::{Caller, MaybeCaller},
    response::ApiResponse,
    state::AppState,
};

/// Create profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_profile))
        .route("/me", get(current_profile).patch(update_profile))
        .route("/provision", post(provision_profile))
        .route("/search", get(search_profiles))
        .route("/suggestions", get(suggestions))
        .route("/{username}", get(profile_by_username))
}

/// Profile response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub verified: bool,
    pub followers_count: i32,
    pub following_count: i32,
    pub posts_count: i32,
    pub created_at: String,
    pub is_following: bool,
    pub is_own_profile: bool,
}

impl From<EnrichedProfile> for ProfileResponse {
    fn from(enriched: EnrichedProfile) -> Self {
        let profile = enriched.profile;
        Self {
            id: profile.id,
            user_id: profile.user_id,
            username: profile.username,
            display_name: profile.display_name,
            bio: profile.bio,
            location: profile.location,
            website: profile.website,
            avatar_url: enriched.avatar_url,
            banner_url: enriched.banner_url,
            verified: profile.verified,
            followers_count: profile.followers_count,
            following_count: profile.following_count,
            posts_count: profile.posts_count,
            created_at: profile.created_at.to_rfc3339(),
            is_following: enriched.is_following,
            is_own_profile: enriched.is_own_profile,
        }
    }
}

/// Compact profile card embedded in post, notification, and conversation
/// payloads.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCardResponse {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub verified: bool,
}

impl From<ProfileCard> for ProfileCardResponse {
    fn from(card: ProfileCard) -> Self {
        Self {
            user_id: card.user_id,
            username: card.username,
            display_name: card.display_name,
            avatar_url: card.avatar_url,
            verified: card.verified,
        }
    }
}

/// Create or replace the caller's profile.
async fn create_profile(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Json(input): Json<CreateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .create_or_update(&caller, input)
        .await?;
    info!(user_id = %caller, username = %profile.username, "Profile saved");

    let enriched = state.profile_service.enrich(Some(&caller), profile).await?;
    Ok(ApiResponse::ok(enriched.into()))
}

/// Get the caller's own profile.
async fn current_profile(
    Caller(caller): Caller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.get_current(&caller).await?;
    Ok(ApiResponse::ok(profile.into()))
}

/// Partially update the caller's profile.
async fn update_profile(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.update(&caller, input).await?;
    let enriched = state.profile_service.enrich(Some(&caller), profile).await?;
    Ok(ApiResponse::ok(enriched.into()))
}

/// Provision request, sent by the auth provider on first sign-in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub email: String,
    pub display_name: Option<String>,
}

/// Ensure a profile exists for the caller.
async fn provision_profile(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Json(req): Json<ProvisionRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .provision(&caller, &req.email, req.display_name.as_deref())
        .await?;

    let enriched = state.profile_service.enrich(Some(&caller), profile).await?;
    Ok(ApiResponse::ok(enriched.into()))
}

/// Profile search query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

const fn max_limit() -> u64 {
    100
}

/// Search profiles by username or display name.
async fn search_profiles(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<ProfileResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let profiles = state
        .profile_service
        .search(caller.as_deref(), &query.q, limit)
        .await?;
    Ok(ApiResponse::ok(
        profiles.into_iter().map(Into::into).collect(),
    ))
}

/// Suggestions query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub limit: Option<u64>,
}

/// Suggest profiles for the caller to follow.
async fn suggestions(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<SuggestionsQuery>,
) -> AppResult<ApiResponse<Vec<ProfileResponse>>> {
    let limit = query.limit.map(|limit| limit.clamp(1, max_limit()));
    let profiles = state
        .profile_service
        .suggested(caller.as_deref(), limit)
        .await?;
    Ok(ApiResponse::ok(
        profiles.into_iter().map(Into::into).collect(),
    ))
}

/// Get a profile by username.
async fn profile_by_username(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .get_by_username(caller.as_deref(), &username)
        .await?;
    Ok(ApiResponse::ok(profile.into()))
}
