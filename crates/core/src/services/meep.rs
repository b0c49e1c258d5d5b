//! Meep service.

use squeaker_common::{AppError, AppResult, IdGenerator};
use squeaker_db::{
    entities::{comment, meep},
    repositories::{CommentRepository, MeepLikeRepository, MeepRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::hashtag::HashtagService;
use crate::services::notification::NotificationService;

/// Input for creating a new meep.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeepInput {
    #[validate(length(min = 1, max = 200))]
    pub body: String,
}

/// Input for updating a meep's body.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeepInput {
    #[validate(length(min = 1, max = 200))]
    pub body: String,
}

/// Input for commenting on a meep.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 200))]
    pub body: String,
}

/// Meep service for business logic.
#[derive(Clone)]
pub struct MeepService {
    meep_repo: MeepRepository,
    user_repo: UserRepository,
    like_repo: MeepLikeRepository,
    comment_repo: CommentRepository,
    hashtag_service: HashtagService,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl MeepService {
    /// Create a new meep service.
    #[must_use]
    pub const fn new(
        meep_repo: MeepRepository,
        user_repo: UserRepository,
        like_repo: MeepLikeRepository,
        comment_repo: CommentRepository,
        hashtag_service: HashtagService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            meep_repo,
            user_repo,
            like_repo,
            comment_repo,
            hashtag_service,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new meep and index its hashtags.
    ///
    /// Extraction failures are not swallowed here. A meep whose tags
    /// could not be indexed surfaces the error to the caller rather than
    /// silently missing from tag pages.
    pub async fn create(&self, user_id: &str, input: CreateMeepInput) -> AppResult<meep::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;

        let model = meep::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            body: Set(input.body),
            likes_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let meep = self.meep_repo.create(model).await?;

        self.hashtag_service.index_meep(&meep.id, &meep.body).await?;
        self.user_repo.increment_meeps_count(&user.id).await?;

        Ok(meep)
    }

    /// Update a meep's body and re-index its hashtags.
    pub async fn update(
        &self,
        user_id: &str,
        meep_id: &str,
        input: UpdateMeepInput,
    ) -> AppResult<meep::Model> {
        input.validate()?;

        let meep = self.meep_repo.get_by_id(meep_id).await?;
        if meep.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can edit a meep".to_string(),
            ));
        }

        let mut active: meep::ActiveModel = meep.into();
        active.body = Set(input.body);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let meep = self.meep_repo.update(active).await?;

        self.hashtag_service.index_meep(&meep.id, &meep.body).await?;

        Ok(meep)
    }

    /// Delete a meep.
    pub async fn delete(&self, user_id: &str, meep_id: &str) -> AppResult<()> {
        let meep = self.meep_repo.get_by_id(meep_id).await?;
        if meep.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete a meep".to_string(),
            ));
        }

        self.meep_repo.delete(meep_id).await?;
        self.user_repo.decrement_meeps_count(user_id).await?;

        Ok(())
    }

    /// Get a meep by ID.
    pub async fn get(&self, meep_id: &str) -> AppResult<meep::Model> {
        self.meep_repo.get_by_id(meep_id).await
    }

    /// Get the most recent meeps.
    pub async fn list_recent(&self, limit: u64) -> AppResult<Vec<meep::Model>> {
        self.meep_repo.find_recent(limit).await
    }

    /// Get the most recent meeps by one author.
    pub async fn list_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<meep::Model>> {
        self.meep_repo.find_by_user(user_id, limit).await
    }

    /// Get the most recent meeps tagged with a hashtag name.
    pub async fn list_by_hashtag(&self, name: &str, limit: u64) -> AppResult<Vec<meep::Model>> {
        self.meep_repo.find_by_hashtag(name, limit).await
    }

    /// Like a meep. Repeat likes are a no-op. Returns `true` if a like
    /// was recorded.
    pub async fn like(&self, user_id: &str, meep_id: &str) -> AppResult<bool> {
        let meep = self.meep_repo.get_by_id(meep_id).await?;

        if !self.like_repo.create_if_absent(meep_id, user_id).await? {
            return Ok(false);
        }

        self.meep_repo.increment_likes_count(meep_id).await?;

        self.notification_service
            .notify_like(&meep.user_id, user_id, meep_id)
            .await?;

        Ok(true)
    }

    /// Remove a like. Returns `true` if a like was removed.
    pub async fn unlike(&self, user_id: &str, meep_id: &str) -> AppResult<bool> {
        self.meep_repo.get_by_id(meep_id).await?;

        if !self.like_repo.delete(meep_id, user_id).await? {
            return Ok(false);
        }

        self.meep_repo.decrement_likes_count(meep_id).await?;

        Ok(true)
    }

    /// Search meeps by body text, newest first.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<meep::Model>> {
        self.meep_repo.search_body(query, limit).await
    }

    /// Comment on a meep and notify its author.
    pub async fn comment(
        &self,
        user_id: &str,
        meep_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let meep = self.meep_repo.get_by_id(meep_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            meep_id: Set(meep.id.clone()),
            user_id: Set(user_id.to_string()),
            body: Set(input.body),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;

        self.notification_service
            .notify_comment(&meep.user_id, user_id, &meep.id, &comment.id)
            .await?;

        Ok(comment)
    }

    /// Get comments for a meep, oldest first.
    pub async fn list_comments(&self, meep_id: &str, limit: u64) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_meep(meep_id, limit).await
    }
}
