//! Meep-hashtag link entity (junction table).
//!
//! At most one row per (meep, hashtag) pair; enforced by a unique index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meep_hashtag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Linked meep ID
    pub meep_id: String,

    /// Linked hashtag ID
    pub hashtag_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meep::Entity",
        from = "Column::MeepId",
        to = "super::meep::Column::Id",
        on_delete = "Cascade"
    )]
    Meep,

    #[sea_orm(
        belongs_to = "super::hashtag::Entity",
        from = "Column::HashtagId",
        to = "super::hashtag::Column::Id",
        on_delete = "Cascade"
    )]
    Hashtag,
}

impl Related<super::meep::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meep.def()
    }
}

impl Related<super::hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hashtag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
