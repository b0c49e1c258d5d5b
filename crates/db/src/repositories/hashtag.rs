//! Hashtag repository.

use std::sync::Arc;

use crate::entities::{Hashtag, hashtag};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use squeaker_common::{AppError, AppResult, IdGenerator};

/// Hashtag repository for database operations.
#[derive(Clone)]
pub struct HashtagRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl HashtagRepository {
    /// Create a new hashtag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a hashtag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<hashtag::Model>> {
        let name_lower = name.to_lowercase();
        Hashtag::find()
            .filter(hashtag::Column::Name.eq(&name_lower))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a hashtag by name, returning an error if not found.
    pub async fn get_by_name(&self, name: &str) -> AppResult<hashtag::Model> {
        self.find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hashtag not found: {name}")))
    }

    /// Get or create a hashtag.
    ///
    /// Two extractors can race on the first use of a tag; the unique
    /// constraint on `name` decides the winner and the loser re-fetches
    /// instead of failing.
    pub async fn get_or_create(&self, name: &str) -> AppResult<hashtag::Model> {
        let name_lower = name.to_lowercase();

        if let Some(tag) = self.find_by_name(&name_lower).await? {
            return Ok(tag);
        }

        let model = hashtag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name_lower.clone()),
            created_at: Set(Utc::now().into()),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(tag) => Ok(tag),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_by_name(&name_lower)
                .await?
                .ok_or_else(|| {
                    AppError::Database(format!(
                        "hashtag {name_lower} missing after unique conflict"
                    ))
                }),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Search hashtags by prefix.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        let query_lower = query.to_lowercase();
        let pattern = format!("{query_lower}%");

        Hashtag::find()
            .filter(hashtag::Column::Name.like(&pattern))
            .order_by_asc(hashtag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recently created hashtags.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        Hashtag::find()
            .order_by_desc(hashtag::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
