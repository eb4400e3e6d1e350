//! Bookmark entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookmark")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User who bookmarked the post.
    pub user_id: String,

    /// Bookmarked post ID.
    ///
    /// Not a foreign key: a bookmark survives deletion of the post it points
    /// at ("saved even if gone"), so the reference may dangle.
    pub post_id: String,

    /// When the bookmark was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
