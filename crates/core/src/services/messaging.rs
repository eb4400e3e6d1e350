//! Messaging service for direct conversations.

use chirp_common::{AppError, AppResult, IdGenerator, Page};
use chirp_db::{
    entities::{conversation, message},
    repositories::conversation::sorted_pair,
    repositories::{ConversationRepository, MessageRepository, ProfileRepository},
};
use chrono::Utc;
use sea_orm::Set;

use crate::services::media::MediaService;
use crate::services::profile::ProfileCard;

/// Maximum message length in characters, applied after trimming.
const MAX_MESSAGE_LENGTH: usize = 1000;

/// How many characters of a message survive into the conversation preview.
const PREVIEW_LENGTH: usize = 50;

/// How many conversations a listing returns.
const CONVERSATION_LIST_LIMIT: u64 = 50;

/// Conversation with partner context for listing.
pub struct ConversationSummary {
    /// The underlying conversation row.
    pub conversation: conversation::Model,
    /// The other participant. Absent if their profile has been deleted.
    pub partner: Option<ProfileCard>,
    /// Messages from the partner the caller has not read yet.
    pub unread_count: u64,
}

/// Message stamped with whether the viewer sent it.
pub struct EnrichedMessage {
    /// The underlying message row.
    pub message: message::Model,
    /// Whether the viewer is the sender.
    pub is_own: bool,
}

/// Messaging service for business logic.
#[derive(Clone)]
pub struct MessagingService {
    conversation_repo: ConversationRepository,
    message_repo: MessageRepository,
    profile_repo: ProfileRepository,
    media: MediaService,
    id_gen: IdGenerator,
}

impl MessagingService {
    /// Create a new messaging service.
    #[must_use]
    pub const fn new(
        conversation_repo: ConversationRepository,
        message_repo: MessageRepository,
        profile_repo: ProfileRepository,
        media: MediaService,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
            profile_repo,
            media,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find or start the conversation between the caller and another user.
    pub async fn get_or_create_conversation(
        &self,
        caller: &str,
        other_user_id: &str,
    ) -> AppResult<conversation::Model> {
        if caller == other_user_id {
            return Err(AppError::InvalidArgument(
                "Cannot message yourself".to_string(),
            ));
        }

        // The other side must be a provisioned user
        self.profile_repo.get_by_user_id(other_user_id).await?;

        if let Some(existing) = self
            .conversation_repo
            .find_by_participants(caller, other_user_id)
            .await?
        {
            return Ok(existing);
        }

        let (p1, p2) = sorted_pair(caller, other_user_id);
        let now = Utc::now();
        let model = conversation::ActiveModel {
            id: Set(self.id_gen.generate()),
            participant1_id: Set(p1.to_string()),
            participant2_id: Set(p2.to_string()),
            last_message_at: Set(now.into()),
            last_message_preview: Set(String::new()),
            created_at: Set(now.into()),
        };

        let conversation = self.conversation_repo.create(model).await?;
        tracing::debug!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    /// Send a message in a conversation.
    pub async fn send(
        &self,
        caller: &str,
        conversation_id: &str,
        content: &str,
    ) -> AppResult<message::Model> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidArgument(
                "Message cannot be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::InvalidArgument(format!(
                "Message cannot exceed {MAX_MESSAGE_LENGTH} characters"
            )));
        }

        let conversation = self.conversation_repo.get_by_id(conversation_id).await?;
        ensure_participant(&conversation, caller)?;

        let now = Utc::now();
        let model = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            conversation_id: Set(conversation_id.to_string()),
            sender_id: Set(caller.to_string()),
            content: Set(content.to_string()),
            is_read: Set(false),
            created_at: Set(now.into()),
        };
        let message = self.message_repo.create(model).await?;

        self.conversation_repo
            .touch(conversation_id, &preview(content), now)
            .await?;

        Ok(message)
    }

    /// Messages in a conversation, oldest first within the page.
    ///
    /// Fetched newest-first for cursoring, then reversed for display. The
    /// cursor is the oldest returned message ID.
    pub async fn messages(
        &self,
        caller: &str,
        conversation_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Page<EnrichedMessage>> {
        let conversation = self.conversation_repo.get_by_id(conversation_id).await?;
        ensure_participant(&conversation, caller)?;

        let rows = self
            .message_repo
            .find_by_conversation(conversation_id, limit + 1, until_id)
            .await?;
        let mut page = Page::from_overfetch(rows, limit, |m| m.id.clone());
        page.items.reverse();

        Ok(page.map(|message| EnrichedMessage {
            is_own: message.sender_id == caller,
            message,
        }))
    }

    /// Mark the other side's messages as read, returning how many changed.
    pub async fn mark_read(&self, caller: &str, conversation_id: &str) -> AppResult<u64> {
        let conversation = self.conversation_repo.get_by_id(conversation_id).await?;
        ensure_participant(&conversation, caller)?;

        self.message_repo.mark_as_read(conversation_id, caller).await
    }

    /// The caller's conversations, most recent activity first.
    pub async fn conversations(&self, caller: &str) -> AppResult<Vec<ConversationSummary>> {
        let conversations = self
            .conversation_repo
            .find_by_user(caller, CONVERSATION_LIST_LIMIT)
            .await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let partner_id = if conversation.participant1_id == caller {
                conversation.participant2_id.clone()
            } else {
                conversation.participant1_id.clone()
            };

            let partner = self
                .profile_repo
                .find_by_user_id(&partner_id)
                .await?
                .map(|p| ProfileCard::from_profile(&p, &self.media));
            let unread_count = self
                .message_repo
                .count_unread(&conversation.id, caller)
                .await?;

            summaries.push(ConversationSummary {
                conversation,
                partner,
                unread_count,
            });
        }

        Ok(summaries)
    }

    /// Delete a message. Only the sender can.
    pub async fn delete_message(&self, caller: &str, message_id: &str) -> AppResult<()> {
        let message = self
            .message_repo
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {message_id}")))?;

        if message.sender_id != caller {
            return Err(AppError::Forbidden(
                "Cannot delete another user's message".to_string(),
            ));
        }

        self.message_repo.delete(message_id).await
    }

    /// Search profiles to start a conversation with, excluding the caller.
    pub async fn search_partners(
        &self,
        caller: &str,
        term: &str,
        limit: u64,
    ) -> AppResult<Vec<ProfileCard>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(vec![]);
        }

        let profiles = self.profile_repo.search(term, limit).await?;
        Ok(profiles
            .iter()
            .filter(|p| p.user_id != caller)
            .map(|p| ProfileCard::from_profile(p, &self.media))
            .collect())
    }
}

fn ensure_participant(conversation: &conversation::Model, user_id: &str) -> AppResult<()> {
    if conversation.participant1_id != user_id && conversation.participant2_id != user_id {
        return Err(AppError::Forbidden(
            "Not a conversation participant".to_string(),
        ));
    }
    Ok(())
}

/// Conversation list preview: the leading characters of a message, elided
/// when it runs long.
fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_LENGTH {
        let truncated: String = content.chars().take(PREVIEW_LENGTH).collect();
        format!("{truncated}...")
    } else {
        content.to_string()
    }
}
