//! User repository.

use std::sync::Arc;

use crate::entities::{User, follow, user};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};
use squeaker_common::{AppError, AppResult, IdGenerator};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user. A taken username is a conflict.
    pub async fn create(
        &self,
        username: &str,
        display_name: Option<&str>,
    ) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            display_name: Set(display_name.map(std::string::ToString::to_string)),
            meeps_count: Set(0),
            created_at: Set(Utc::now().into()),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(user) => Ok(user),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                AppError::Conflict(format!("Username already taken: {username}")),
            ),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Increment meep count for a user. The bump happens in SQL so
    /// concurrent requests do not lose updates.
    pub async fn increment_meeps_count(&self, id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::MeepsCount,
                Expr::col(user::Column::MeepsCount).add(1),
            )
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement meep count for a user, never below zero.
    pub async fn decrement_meeps_count(&self, id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::MeepsCount,
                Expr::col(user::Column::MeepsCount).sub(1),
            )
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::MeepsCount.gt(0))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Users the given user is not following yet, excluding the user
    /// themselves, ranked by follower count descending with username
    /// ascending as the tie-break.
    pub async fn find_suggested(&self, user_id: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let followed = Query::select()
            .column(follow::Column::FolloweeId)
            .from(follow::Entity)
            .and_where(Expr::col(follow::Column::FollowerId).eq(user_id))
            .to_owned();

        let follower_count = Func::count(Expr::col((follow::Entity, follow::Column::Id)));

        User::find()
            .filter(user::Column::Id.ne(user_id))
            .filter(user::Column::Id.not_in_subquery(followed))
            .join_rev(JoinType::LeftJoin, follow::Relation::Followee.def())
            .group_by(user::Column::Id)
            .order_by_desc(Expr::expr(follower_count))
            .order_by_asc(user::Column::Username)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            display_name: None,
            meeps_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let user = create_test_user("u1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_username("alice").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_user_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_increment_meeps_count_is_single_statement() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        repo.increment_meeps_count("u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_suggested_maps_rows() {
        let bob = create_test_user("u2", "bob");
        let carol = create_test_user("u3", "carol");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob, carol]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_suggested("u1", 3).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "u2");
    }
}
