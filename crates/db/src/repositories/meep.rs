//! Meep repository.

use std::sync::Arc;

use crate::entities::{Meep, hashtag, meep, meep_hashtag};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use squeaker_common::{AppError, AppResult};

/// Meep repository for database operations.
#[derive(Clone)]
pub struct MeepRepository {
    db: Arc<DatabaseConnection>,
}

impl MeepRepository {
    /// Create a new meep repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a meep by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<meep::Model>> {
        Meep::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a meep by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<meep::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::MeepNotFound(id.to_string()))
    }

    /// Create a new meep.
    pub async fn create(&self, model: meep::ActiveModel) -> AppResult<meep::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a meep.
    pub async fn update(&self, model: meep::ActiveModel) -> AppResult<meep::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a meep. Link rows, likes, and comments go with it via FK
    /// cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let meep = self.get_by_id(id).await?;
        meep.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get the most recent meeps.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<meep::Model>> {
        Meep::find()
            .order_by_desc(meep::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recent meeps by one author.
    pub async fn find_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<meep::Model>> {
        Meep::find()
            .filter(meep::Column::UserId.eq(user_id))
            .order_by_desc(meep::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the most recent meeps linked to a hashtag name.
    pub async fn find_by_hashtag(&self, name: &str, limit: u64) -> AppResult<Vec<meep::Model>> {
        let name_lower = name.to_lowercase();

        Meep::find()
            .join(JoinType::InnerJoin, meep::Relation::MeepHashtag.def())
            .join(JoinType::InnerJoin, meep_hashtag::Relation::Hashtag.def())
            .filter(hashtag::Column::Name.eq(&name_lower))
            .order_by_desc(meep::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search meeps whose body contains the query, newest first.
    pub async fn search_body(&self, query: &str, limit: u64) -> AppResult<Vec<meep::Model>> {
        Meep::find()
            .filter(meep::Column::Body.contains(query))
            .order_by_desc(meep::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment like count for a meep. The bump happens in SQL so
    /// concurrent likes do not lose updates.
    pub async fn increment_likes_count(&self, id: &str) -> AppResult<()> {
        Meep::update_many()
            .col_expr(
                meep::Column::LikesCount,
                Expr::col(meep::Column::LikesCount).add(1),
            )
            .filter(meep::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement like count for a meep, never below zero.
    pub async fn decrement_likes_count(&self, id: &str) -> AppResult<()> {
        Meep::update_many()
            .col_expr(
                meep::Column::LikesCount,
                Expr::col(meep::Column::LikesCount).sub(1),
            )
            .filter(meep::Column::Id.eq(id))
            .filter(meep::Column::LikesCount.gt(0))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all meeps.
    pub async fn count(&self) -> AppResult<u64> {
        Meep::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of meeps ordered by ID (for the backfill tool).
    pub async fn find_page(&self, page: u64, per_page: u64) -> AppResult<Vec<meep::Model>> {
        Meep::find()
            .order_by_asc(meep::Column::Id)
            .paginate(self.db.as_ref(), per_page)
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_meep(id: &str, user_id: &str, body: &str) -> meep::Model {
        meep::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            body: body.to_string(),
            likes_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_meep_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<meep::Model>::new()])
                .into_connection(),
        );

        let repo = MeepRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::MeepNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let meep1 = create_test_meep("m2", "u1", "second");
        let meep2 = create_test_meep("m1", "u1", "first");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[meep1, meep2]])
                .into_connection(),
        );

        let repo = MeepRepository::new(db);
        let result = repo.find_by_user("u1", 10).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "m2");
    }

    #[tokio::test]
    async fn test_search_body() {
        let meep1 = create_test_meep("m1", "u1", "shipping the release today");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[meep1]])
                .into_connection(),
        );

        let repo = MeepRepository::new(db);
        let result = repo.search_body("release", 50).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "m1");
    }

    #[tokio::test]
    async fn test_find_by_hashtag() {
        let meep1 = create_test_meep("m1", "u1", "all about #rust");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[meep1]])
                .into_connection(),
        );

        let repo = MeepRepository::new(db);
        let result = repo.find_by_hashtag("Rust", 10).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "m1");
    }
}
