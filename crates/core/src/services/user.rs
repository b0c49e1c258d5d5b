//! User service.

use squeaker_common::{AppError, AppResult};
use squeaker_db::{
    entities::user,
    repositories::{FollowRepository, UserRepository},
};
use serde::Deserialize;
use validator::Validate;

use crate::services::notification::NotificationService;

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserInput {
    #[validate(length(min = 1, max = 30), regex(path = *USERNAME_RE))]
    pub username: String,

    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

// Regex pattern - a valid static pattern that cannot fail
#[allow(clippy::unwrap_used)]
static USERNAME_RE: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^\w+$").unwrap());

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    follow_repo: FollowRepository,
    notification_service: NotificationService,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        follow_repo: FollowRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            user_repo,
            follow_repo,
            notification_service,
        }
    }

    /// Register a new user.
    pub async fn register(&self, input: RegisterUserInput) -> AppResult<user::Model> {
        input.validate()?;
        self.user_repo
            .create(&input.username, input.display_name.as_deref())
            .await
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Follow a user. Repeat follows are a no-op. Returns `true` if a
    /// follow was recorded.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        if follower_id == followee_id {
            return Err(AppError::BadRequest(
                "Users cannot follow themselves".to_string(),
            ));
        }

        // Both sides must exist before the edge is written
        self.user_repo.get_by_id(followee_id).await?;

        if !self
            .follow_repo
            .create_if_absent(follower_id, followee_id)
            .await?
        {
            return Ok(false);
        }

        self.notification_service
            .notify_follow(followee_id, follower_id)
            .await?;

        Ok(true)
    }

    /// Suggest users to follow.
    ///
    /// Excludes the user themselves and everyone they already follow,
    /// ranked by follower count.
    pub async fn suggested_users(&self, user_id: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_suggested(user_id, limit).await
    }

    /// Unfollow a user. Returns `true` if a follow was removed.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.delete(follower_id, followee_id).await
    }

    /// Is `follower_id` following `followee_id`?
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.exists(follower_id, followee_id).await
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_followers(user_id).await
    }

    /// Count users a user is following.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_following(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use squeaker_db::repositories::NotificationRepository;
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            display_name: None,
            meeps_count: 0,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> UserService {
        UserService::new(
            UserRepository::new(db.clone()),
            FollowRepository::new(db.clone()),
            NotificationService::new(NotificationRepository::new(db)),
        )
    }

    #[tokio::test]
    async fn test_register_rejects_bad_username() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service
            .register(RegisterUserInput {
                username: "not valid!".to_string(),
                display_name: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_username() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service
            .register(RegisterUserInput {
                username: String::new(),
                display_name: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follow_self_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let result = service.follow("u1", "u1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_followee() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.follow("u1", "missing").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_username_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.get_by_username("ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_suggested_users_passes_through() {
        let bob = create_test_user("u2", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.suggested_users("u1", 3).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].username, "bob");
    }

    #[tokio::test]
    async fn test_get_by_username_found() {
        let user = create_test_user("u1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.get_by_username("alice").await.unwrap();
        assert_eq!(result.id, "u1");
    }
}
