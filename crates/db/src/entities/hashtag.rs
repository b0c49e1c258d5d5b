//! Hashtag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hashtag for indexing and trending.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hashtag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The hashtag name (lowercase, without #)
    #[sea_orm(unique)]
    pub name: String,

    /// When this hashtag was first seen
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::meep_hashtag::Entity")]
    MeepHashtag,
}

impl Related<super::meep_hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeepHashtag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
