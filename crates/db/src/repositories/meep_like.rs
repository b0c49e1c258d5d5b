//! Meep like repository.

use std::sync::Arc;

use crate::entities::{MeepLike, meep_like};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};
use squeaker_common::{AppError, AppResult, IdGenerator};

/// Meep like repository for database operations.
#[derive(Clone)]
pub struct MeepLikeRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl MeepLikeRepository {
    /// Create a new meep like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Does this user like this meep?
    pub async fn exists(&self, meep_id: &str, user_id: &str) -> AppResult<bool> {
        let count = MeepLike::find()
            .filter(meep_like::Column::MeepId.eq(meep_id))
            .filter(meep_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a like if absent. Returns `true` if a row was inserted.
    pub async fn create_if_absent(&self, meep_id: &str, user_id: &str) -> AppResult<bool> {
        let model = meep_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            meep_id: Set(meep_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Remove a like. Returns `true` if a row was deleted.
    pub async fn delete(&self, meep_id: &str, user_id: &str) -> AppResult<bool> {
        let result = MeepLike::delete_many()
            .filter(meep_like::Column::MeepId.eq(meep_id))
            .filter(meep_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count likes for a meep.
    pub async fn count_by_meep(&self, meep_id: &str) -> AppResult<u64> {
        MeepLike::find()
            .filter(meep_like::Column::MeepId.eq(meep_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
