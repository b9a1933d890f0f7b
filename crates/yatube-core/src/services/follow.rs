//! Follow / unfollow toggle.

use super::Repositories;
use crate::domain::{Follow, User};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    /// Following yourself is refused; no edge is written.
    SelfFollow,
}

#[derive(Clone)]
pub struct FollowService {
    repos: Repositories,
}

impl FollowService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Subscribe `user_id` to `author_username`. Repeating the call is a no-op.
    pub async fn follow(
        &self,
        user_id: i64,
        author_username: &str,
    ) -> Result<FollowOutcome, DomainError> {
        let author = self.author(author_username).await?;
        if author.id == user_id {
            tracing::debug!(user_id, "Ignoring self-follow");
            return Ok(FollowOutcome::SelfFollow);
        }

        let created = self
            .repos
            .follows
            .insert_if_absent(user_id, author.id)
            .await?;
        if !created {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        if let Some(user) = self.repos.users.find_by_id(user_id).await? {
            tracing::info!(
                follow = %Follow::new(user_id, author.id).describe(&user, &author),
                "Follow created"
            );
        }
        Ok(FollowOutcome::Followed)
    }

    /// Remove the subscription if present. Returns whether an edge was removed.
    pub async fn unfollow(&self, user_id: i64, author_username: &str) -> Result<bool, DomainError> {
        let author = self.author(author_username).await?;
        let removed = self.repos.follows.remove(user_id, author.id).await?;
        if removed {
            tracing::info!(user_id, author_id = author.id, "Follow removed");
        }
        Ok(removed)
    }

    async fn author(&self, username: &str) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }
}
