//! Conversation entity for direct messages.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// First participant user ID
    #[sea_orm(indexed)]
    pub participant1_id: String,

    /// Second participant user ID
    #[sea_orm(indexed)]
    pub participant2_id: String,

    /// When the most recent message was sent
    pub last_message_at: DateTimeWithTimeZone,

    /// Truncated text of the most recent message, for conversation lists
    #[sea_orm(column_type = "Text")]
    pub last_message_preview: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::message::Entity")]
    Message,
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
