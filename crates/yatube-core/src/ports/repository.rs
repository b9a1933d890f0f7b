use async_trait::async_trait;

use crate::domain::{
    Comment, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostFilter, User,
};
use crate::error::RepoError;

/// Generic repository trait for lookups and removal by primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Dependent rows follow the store's
    /// cascade rules.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository.
///
/// Deleting a user removes their posts, comments and follow edges on both sides.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Fetch several users at once; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, RepoError>;
}

/// Group repository.
///
/// Deleting a group keeps its posts and clears their `group_id`.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Group>, RepoError>;

    /// All groups ordered by title, for form choices.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Insert a post, stamping `pub_date` with the current time.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Persist text, group and image of an existing post. `pub_date` and
    /// `author_id` are left as stored.
    async fn update(&self, post: &Post) -> Result<Post, RepoError>;

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    /// One slice of the feed, newest first.
    async fn list(&self, filter: PostFilter, offset: u64, limit: u64)
    -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of a post, oldest first.
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;
}

/// Follow edge repository. The (user, author) pair is unique in the store.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the edge unless it already exists. Returns whether a row was added.
    async fn insert_if_absent(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    /// Remove the edge. Returns whether a row was removed.
    async fn remove(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    async fn exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;
}
