//! Business logic services.

#![allow(missing_docs)]

pub mod hashtag;
pub mod meep;
pub mod notification;
pub mod trending;
pub mod user;

pub use hashtag::{HashtagService, extract_hashtags};
pub use meep::{CreateCommentInput, CreateMeepInput, MeepService, UpdateMeepInput};
pub use notification::NotificationService;
pub use trending::{TrendingService, TrendingTopic, TrendingWindow};
pub use user::{RegisterUserInput, UserService};
