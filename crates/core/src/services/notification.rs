//! Notification service.

use squeaker_common::{AppResult, IdGenerator};
use squeaker_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a like notification.
    ///
    /// Actions on your own meeps are not notified, and a repeat like of
    /// the same meep by the same sender is suppressed.
    pub async fn notify_like(
        &self,
        recipient_id: &str,
        sender_id: &str,
        meep_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == sender_id {
            return Ok(None);
        }

        if self
            .notification_repo
            .like_exists(recipient_id, sender_id, meep_id)
            .await?
        {
            return Ok(None);
        }

        self.create_internal(
            recipient_id,
            sender_id,
            NotificationType::Like,
            Some(meep_id),
            None,
        )
        .await
        .map(Some)
    }

    /// Create a comment notification.
    pub async fn notify_comment(
        &self,
        recipient_id: &str,
        sender_id: &str,
        meep_id: &str,
        comment_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == sender_id {
            return Ok(None);
        }

        self.create_internal(
            recipient_id,
            sender_id,
            NotificationType::Comment,
            Some(meep_id),
            Some(comment_id),
        )
        .await
        .map(Some)
    }

    /// Create a follow notification.
    pub async fn notify_follow(
        &self,
        recipient_id: &str,
        sender_id: &str,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == sender_id {
            return Ok(None);
        }

        self.create_internal(recipient_id, sender_id, NotificationType::Follow, None, None)
            .await
            .map(Some)
    }

    /// Internal helper to create notifications.
    async fn create_internal(
        &self,
        recipient_id: &str,
        sender_id: &str,
        notification_type: NotificationType,
        meep_id: Option<&str>,
        comment_id: Option<&str>,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            notification_type: Set(notification_type),
            meep_id: Set(meep_id.map(std::string::ToString::to_string)),
            comment_id: Set(comment_id.map(std::string::ToString::to_string)),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    /// Path a notification links to when clicked.
    ///
    /// Like and comment notifications point at the meep; follow
    /// notifications point at the sender's profile. A like or comment
    /// whose meep is gone falls back to the sender's profile.
    #[must_use]
    pub fn destination(notification: &notification::Model) -> String {
        match notification.notification_type {
            NotificationType::Like | NotificationType::Comment => {
                notification.meep_id.as_ref().map_or_else(
                    || format!("/profiles/{}", notification.sender_id),
                    |meep_id| format!("/meeps/{meep_id}"),
                )
            }
            NotificationType::Follow => format!("/profiles/{}", notification.sender_id),
        }
    }

    /// Get notifications for a user, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit, unread_only)
            .await
    }

    /// Mark a notification as read. Only the recipient may do so.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.find_by_id(notification_id).await?;
        if let Some(n) = notification
            && n.recipient_id == user_id
        {
            self.notification_repo.mark_as_read(notification_id).await?;
        }
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn create_test_notification(
        notification_type: NotificationType,
        meep_id: Option<&str>,
    ) -> notification::Model {
        notification::Model {
            id: "n1".to_string(),
            recipient_id: "u1".to_string(),
            sender_id: "u2".to_string(),
            notification_type,
            meep_id: meep_id.map(std::string::ToString::to_string),
            comment_id: None,
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_destination_like_points_at_meep() {
        let n = create_test_notification(NotificationType::Like, Some("m1"));
        assert_eq!(NotificationService::destination(&n), "/meeps/m1");
    }

    #[test]
    fn test_destination_comment_points_at_meep() {
        let n = create_test_notification(NotificationType::Comment, Some("m9"));
        assert_eq!(NotificationService::destination(&n), "/meeps/m9");
    }

    #[test]
    fn test_destination_follow_points_at_sender_profile() {
        let n = create_test_notification(NotificationType::Follow, None);
        assert_eq!(NotificationService::destination(&n), "/profiles/u2");
    }

    #[test]
    fn test_destination_like_without_meep_falls_back_to_profile() {
        let n = create_test_notification(NotificationType::Like, None);
        assert_eq!(NotificationService::destination(&n), "/profiles/u2");
    }

    #[tokio::test]
    async fn test_notify_like_skips_self() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.notify_like("u1", "u1", "m1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_notify_like_deduplicates() {
        // like_exists count query returns 1
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! { "num_items" => Value::from(1i64) }]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.notify_like("u1", "u2", "m1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_notify_like_creates_when_new() {
        let created = create_test_notification(NotificationType::Like, Some("m1"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! { "num_items" => Value::from(0i64) }]])
                .append_query_results([[created]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.notify_like("u1", "u2", "m1").await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_notify_follow_skips_self() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.notify_follow("u1", "u1").await.unwrap();
        assert!(result.is_none());
    }
}
