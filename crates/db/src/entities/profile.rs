//! Profile entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning auth-subsystem user ID (1:1)
    #[sea_orm(unique)]
    pub user_id: String,

    /// Unique handle, stored lowercase
    #[sea_orm(unique)]
    pub username: String,

    /// Display name
    pub display_name: String,

    /// Profile description
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    /// Avatar URL (used when no storage reference is set)
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Banner URL (used when no storage reference is set)
    #[sea_orm(nullable)]
    pub banner_url: Option<String>,

    /// Object-store reference for the avatar, resolved at read time
    #[sea_orm(nullable)]
    pub avatar_file_id: Option<String>,

    /// Object-store reference for the banner, resolved at read time
    #[sea_orm(nullable)]
    pub banner_file_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub verified: bool,

    /// Followers count (denormalized)
    #[sea_orm(default_value = 0)]
    pub followers_count: i32,

    /// Following count (denormalized)
    #[sea_orm(default_value = 0)]
    pub following_count: i32,

    /// Posts count (denormalized)
    #[sea_orm(default_value = 0)]
    pub posts_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
