//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod hashtag;
pub mod meep;
pub mod meep_hashtag;
pub mod meep_like;
pub mod notification;
pub mod user;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use hashtag::Entity as Hashtag;
pub use meep::Entity as Meep;
pub use meep_hashtag::Entity as MeepHashtag;
pub use meep_like::Entity as MeepLike;
pub use notification::Entity as Notification;
pub use user::Entity as User;
