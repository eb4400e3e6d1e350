//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    /// Post text content
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Attached media URLs
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub media_urls: Option<Json>,

    /// Parent post ID when this post is a reply.
    ///
    /// Not a foreign key: a reply outlives its parent and the reference is
    /// left dangling after the parent is deleted.
    #[sea_orm(nullable, indexed)]
    pub reply_to_id: Option<String>,

    /// Quoted post ID when this post is a quote. Dangles like `reply_to_id`.
    #[sea_orm(nullable, indexed)]
    pub quoted_post_id: Option<String>,

    /// Mentioned usernames, lowercase, extracted at write time
    #[sea_orm(column_type = "JsonBinary")]
    pub mentions: Json,

    /// Hashtags, lowercase, extracted at write time
    #[sea_orm(column_type = "JsonBinary")]
    pub hashtags: Json,

    /// Likes count (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    /// Reposts count (denormalized)
    #[sea_orm(default_value = 0)]
    pub reposts_count: i32,

    /// Replies count (denormalized)
    #[sea_orm(default_value = 0)]
    pub replies_count: i32,

    /// Views count (denormalized)
    #[sea_orm(default_value = 0)]
    pub views_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "Entity", from = "Column::ReplyToId", to = "Column::Id")]
    Parent,

    #[sea_orm(belongs_to = "Entity", from = "Column::QuotedPostId", to = "Column::Id")]
    Quoted,
}

impl ActiveModelBehavior for ActiveModel {}
