//! Database repositories.
//!
//! Each repository wraps a shared [`sea_orm::DatabaseConnection`] and owns
//! the queries for one table.

pub mod bookmark;
pub mod conversation;
pub mod follow;
pub mod message;
pub mod notification;
pub mod post;
pub mod post_like;
pub mod profile;
pub mod repost;

pub use bookmark::BookmarkRepository;
pub use conversation::ConversationRepository;
pub use follow::FollowRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use post::PostRepository;
pub use post_like::PostLikeRepository;
pub use profile::ProfileRepository;
pub use repost::RepostRepository;
