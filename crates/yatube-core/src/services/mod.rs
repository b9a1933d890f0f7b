//! Application services - the use cases behind each page and action.
//!
//! Services only talk to the ports; the server wires them to concrete
//! repositories through [`Repositories`].

mod accounts;
mod feed;
mod follow;
mod posts;

use std::sync::Arc;

use crate::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

pub use accounts::AccountService;
pub use feed::{CommentCard, FeedService, GroupFeed, GroupRef, PostCard, PostDetail, ProfileFeed};
pub use follow::{FollowOutcome, FollowService};
pub use posts::{EditAccess, EditOutcome, PostService};

/// Handles to every repository the services need.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}
