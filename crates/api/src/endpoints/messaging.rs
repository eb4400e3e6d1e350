//! Direct messaging endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use chirp_common::{AppResult, Page};
use chirp_core::{ConversationSummary, EnrichedMessage};
use chirp_db::entities::conversation;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extractors::{Caller, MaybeCaller},
    response::ApiResponse,
    state::AppState,
};

use super::profiles::ProfileCardResponse;

/// Create conversations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_conversations).post(open_conversation))
        .route("/partners/search", get(search_partners))
        .route(
            "/{conversation_id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/{conversation_id}/read", post(mark_read))
}

/// Create messages router.
pub fn messages_router() -> Router<AppState> {
    Router::new().route("/{message_id}", delete(delete_message))
}

/// Conversation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub partner_id: String,
    /// The other participant's card. Absent when their profile has been
    /// deleted, and on freshly opened conversations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<ProfileCardResponse>,
    pub last_message_at: String,
    pub last_message_preview: String,
    pub unread_count: u64,
    pub created_at: String,
}

impl ConversationResponse {
    /// Build a response for the given viewer, resolving which participant
    /// is the partner.
    fn new(caller: &str, conversation: conversation::Model) -> Self {
        let conversation::Model {
            id,
            participant1_id,
            participant2_id,
            last_message_at,
            last_message_preview,
            created_at,
        } = conversation;

        let partner_id = if participant1_id == caller {
            participant2_id
        } else {
            participant1_id
        };

        Self {
            id,
            partner_id,
            partner: None,
            last_message_at: last_message_at.to_rfc3339(),
            last_message_preview,
            unread_count: 0,
            created_at: created_at.to_rfc3339(),
        }
    }

    fn from_summary(caller: &str, summary: ConversationSummary) -> Self {
        let mut response = Self::new(caller, summary.conversation);
        response.partner = summary.partner.map(Into::into);
        response.unread_count = summary.unread_count;
        response
    }
}

/// Message response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub is_read: bool,
    pub is_own: bool,
    pub created_at: String,
}

impl From<EnrichedMessage> for MessageResponse {
    fn from(enriched: EnrichedMessage) -> Self {
        let message = enriched.message;
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content,
            is_read: message.is_read,
            is_own: enriched.is_own,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// The caller's conversations, most recent activity first. Anonymous
/// viewers get an empty list.
async fn list_conversations(
    MaybeCaller(caller): MaybeCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ConversationResponse>>> {
    let Some(caller) = caller else {
        return Ok(ApiResponse::ok(Vec::new()));
    };

    let summaries = state.messaging_service.conversations(&caller).await?;
    let conversations = summaries
        .into_iter()
        .map(|summary| ConversationResponse::from_summary(&caller, summary))
        .collect();
    Ok(ApiResponse::ok(conversations))
}

/// Open conversation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenConversationRequest {
    pub other_user_id: String,
}

/// Find or start the conversation with another user.
async fn open_conversation(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Json(request): Json<OpenConversationRequest>,
) -> AppResult<ApiResponse<ConversationResponse>> {
    let conversation = state
        .messaging_service
        .get_or_create_conversation(&caller, &request.other_user_id)
        .await?;

    info!(conversation_id = %conversation.id, "Conversation opened");

    Ok(ApiResponse::ok(ConversationResponse::new(
        &caller,
        conversation,
    )))
}

/// Partner search query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Search provisioned users to start a conversation with.
async fn search_partners(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Query(query): Query<PartnerSearchQuery>,
) -> AppResult<ApiResponse<Vec<ProfileCardResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let cards = state
        .messaging_service
        .search_partners(&caller, &query.q, limit)
        .await?;
    Ok(ApiResponse::ok(cards.into_iter().map(Into::into).collect()))
}

/// Message listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    #[serde(default = "default_message_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

const fn default_message_limit() -> u64 {
    50
}

const fn max_limit() -> u64 {
    100
}

/// Messages in a conversation, oldest first within the page.
async fn list_messages(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> AppResult<ApiResponse<Page<MessageResponse>>> {
    let limit = query.limit.clamp(1, max_limit());
    let page = state
        .messaging_service
        .messages(&caller, &conversation_id, limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Send message request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
}

/// Send a message in a conversation.
async fn send_message(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let message = state
        .messaging_service
        .send(&caller, &conversation_id, &request.content)
        .await?;

    info!(message_id = %message.id, conversation_id = %conversation_id, "Message sent");

    Ok(ApiResponse::ok(MessageResponse::from(EnrichedMessage {
        message,
        is_own: true,
    })))
}

/// Mark-read response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub read_count: u64,
}

/// Mark all of the partner's messages in a conversation as read.
async fn mark_read(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    let read_count = state
        .messaging_service
        .mark_read(&caller, &conversation_id)
        .await?;
    Ok(ApiResponse::ok(MarkReadResponse { read_count }))
}

/// Delete one of the caller's own messages.
async fn delete_message(
    Caller(caller): Caller,
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .messaging_service
        .delete_message(&caller, &message_id)
        .await?;

    info!(message_id = %message_id, "Message deleted");

    Ok(ApiResponse::ok(()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_db::entities::message;

    fn sample_conversation() -> conversation::Model {
        conversation::Model {
            id: "c1".to_string(),
            participant1_id: "user1".to_string(),
            participant2_id: "user2".to_string(),
            last_message_at: chrono::Utc::now().into(),
            last_message_preview: "hello".to_string(),
            created_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_message_response_serialization() {
        let enriched = EnrichedMessage {
            message: message::Model {
                id: "m1".to_string(),
                conversation_id: "c1".to_string(),
                sender_id: "user1".to_string(),
                content: "hello".to_string(),
                is_read: false,
                created_at: chrono::Utc::now().into(),
            },
            is_own: true,
        };

        let json = serde_json::to_string(&MessageResponse::from(enriched)).unwrap();
        assert!(json.contains("\"conversationId\":\"c1\""));
        assert!(json.contains("\"isOwn\":true"));
        assert!(json.contains("\"isRead\":false"));
    }

    #[test]
    fn test_partner_resolution_for_either_participant() {
        let response = ConversationResponse::new("user1", sample_conversation());
        assert_eq!(response.partner_id, "user2");

        let response = ConversationResponse::new("user2", sample_conversation());
        assert_eq!(response.partner_id, "user1");
    }

    #[test]
    fn test_summary_carries_unread_count() {
        let summary = ConversationSummary {
            conversation: sample_conversation(),
            partner: None,
            unread_count: 3,
        };

        let response = ConversationResponse::from_summary("user1", summary);
        assert_eq!(response.unread_count, 3);
        assert!(response.partner.is_none());
    }
}
