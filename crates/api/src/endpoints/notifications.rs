//! Notification endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use chirp_common::{AppResult, Page};
use chirp_core::EnrichedNotification;
use chirp_db::entities::notification::NotificationType;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{Caller, MaybeCaller},
    response::ApiResponse,
    state::AppState,
};

use super::posts::PostResponse;
use super::profiles::ProfileCardResponse;

/// Create notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_as_read))
        .route("/{notification_id}/read", post(mark_as_read))
        .route("/{notification_id}", delete(delete_notification))
}

/// Notification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: String,
    /// The user whose action triggered the notification. Absent when their
    /// profile has been deleted since.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<ProfileCardResponse>,
    /// The referenced post, with its author attached. Absent for follow
    /// notifications and for posts deleted since.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Box<PostResponse>>,
}

impl From<EnrichedNotification> for NotificationResponse {
    fn from(enriched: EnrichedNotification) -> Self {
        let EnrichedNotification {
            notification,
            actor,
            post,
            post_author,
        } = enriched;

        let post = post.map(|post| {
            let mut response = PostResponse::from(post);
            response.author = post_author.map(Into::into);
            Box::new(response)
        });

        Self {
            id: notification.id,
            notification_type: notification_type_label(&notification.notification_type),
            is_read: notification.is_read,
            created_at: notification.created_at.to_rfc3339(),
            actor: actor.map(Into::into),
            post,
        }
    }
}

fn notification_type_label(notification_type: &NotificationType) -> String {
    match notification_type {
        NotificationType::Follow => "follow",
        NotificationType::Like => "like",
        NotificationType::Repost => "repost",
        NotificationType::Reply => "reply",
        NotificationType::Mention => "mention",
        NotificationType::Quote => "quote",
    }
    .to_string()
}

/// Notification listing query.
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

/// The caller's notifications, newest first. Anonymous viewers get an
/// empty page.
async fn list_notifications(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<NotificationResponse>>> {
    let Some(caller) = caller else {
        return Ok(ApiResponse::ok(Page::empty()));
    };

    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .notification_service
        .list(&caller, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Unread count response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Count of unread notifications. Zero for anonymous viewers.
async fn unread_count(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = match caller {
        Some(caller) => state.notification_service.unread_count(&caller).await?,
        None => 0,
    };
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

/// Mark one notification as read.
async fn mark_as_read(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .mark_as_read(&caller, &notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Mark-all response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllAsReadResponse {
    pub count: u64,
}

/// Mark all of the caller's notifications as read.
async fn mark_all_as_read(
    Caller(caller): Caller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllAsReadResponse>> {
    let count = state.notification_service.mark_all_as_read(&caller).await?;
    Ok(ApiResponse::ok(MarkAllAsReadResponse { count }))
}

/// Delete a notification.
async fn delete_notification(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .delete(&caller, &notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}
