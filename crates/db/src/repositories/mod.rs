//! Database repositories.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod hashtag;
pub mod meep;
pub mod meep_hashtag;
pub mod meep_like;
pub mod notification;
pub mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use hashtag::HashtagRepository;
pub use meep::MeepRepository;
pub use meep_hashtag::{MeepHashtagRepository, TagUsage};
pub use meep_like::MeepLikeRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;
