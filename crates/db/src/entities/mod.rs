//! Database entities.

pub mod bookmark;
pub mod conversation;
pub mod follow;
pub mod message;
pub mod notification;
pub mod post;
pub mod post_like;
pub mod profile;
pub mod repost;

pub use bookmark::Entity as Bookmark;
pub use conversation::Entity as Conversation;
pub use follow::Entity as Follow;
pub use message::Entity as Message;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use profile::Entity as Profile;
pub use repost::Entity as Repost;
