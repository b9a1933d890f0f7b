//! Post and comment submission.

use std::sync::Arc;

use super::Repositories;
use crate::domain::{Comment, Group, NewComment, NewPost, Post};
use crate::error::DomainError;
use crate::forms::{CommentForm, ImageUpload, PostForm};
use crate::ports::MediaStorage;

/// Whether a user may edit a post.
#[derive(Debug, Clone)]
pub enum EditAccess {
    Allowed(Post),
    NotAuthor,
}

#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(Post),
    /// The editor is not the author; the post was left untouched.
    NotAuthor,
}

#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    media: Arc<dyn MediaStorage>,
}

impl PostService {
    pub fn new(repos: Repositories, media: Arc<dyn MediaStorage>) -> Self {
        Self { repos, media }
    }

    /// Groups offered as choices on the post form.
    pub async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.repos.groups.list().await?)
    }

    pub async fn create_post(
        &self,
        author_id: i64,
        form: &PostForm,
        image: Option<ImageUpload>,
    ) -> Result<Post, DomainError> {
        let groups = self.groups().await?;
        let clean = form
            .clean(&groups, image.as_ref())
            .map_err(DomainError::InvalidForm)?;
        let image = self.store_image(image).await?;

        let created = self
            .repos
            .posts
            .create(NewPost {
                text: clean.text,
                author_id,
                group_id: clean.group_id,
                image: image.clone(),
            })
            .await;
        let post = match created {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(image.as_deref()).await;
                return Err(e.into());
            }
        };

        tracing::info!(post_id = post.id, author_id, post = %post, "Post created");
        Ok(post)
    }

    pub async fn edit_access(&self, editor_id: i64, post_id: i64) -> Result<EditAccess, DomainError> {
        let post = self.load_post(post_id).await?;
        if post.author_id != editor_id {
            return Ok(EditAccess::NotAuthor);
        }
        Ok(EditAccess::Allowed(post))
    }

    /// Reassign text and group of a post. A new image replaces the old one;
    /// without an upload the current image is kept.
    pub async fn edit_post(
        &self,
        editor_id: i64,
        post_id: i64,
        form: &PostForm,
        image: Option<ImageUpload>,
    ) -> Result<EditOutcome, DomainError> {
        let mut post = match self.edit_access(editor_id, post_id).await? {
            EditAccess::Allowed(post) => post,
            EditAccess::NotAuthor => {
                tracing::warn!(post_id, editor_id, "Edit refused: not the author");
                return Ok(EditOutcome::NotAuthor);
            }
        };

        let groups = self.groups().await?;
        let clean = form
            .clean(&groups, image.as_ref())
            .map_err(DomainError::InvalidForm)?;

        post.text = clean.text;
        post.group_id = clean.group_id;
        let uploaded = self.store_image(image).await?;
        if let Some(path) = &uploaded {
            post.image = Some(path.clone());
        }

        let post = match self.repos.posts.update(&post).await {
            Ok(post) => post,
            Err(e) => {
                self.discard_image(uploaded.as_deref()).await;
                return Err(e.into());
            }
        };
        tracing::info!(post_id = post.id, "Post updated");
        Ok(EditOutcome::Updated(post))
    }

    pub async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        form: &CommentForm,
    ) -> Result<Comment, DomainError> {
        let post = self.load_post(post_id).await?;
        let text = form.clean().map_err(DomainError::InvalidForm)?;

        let comment = self
            .repos
            .comments
            .create(NewComment {
                post_id: post.id,
                author_id,
                text,
            })
            .await?;
        tracing::info!(comment_id = comment.id, post_id, author_id, "Comment added");
        Ok(comment)
    }

    async fn load_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn store_image(&self, image: Option<ImageUpload>) -> Result<Option<String>, DomainError> {
        match image.filter(|u| !u.is_empty()) {
            Some(upload) => {
                let path = self
                    .media
                    .save(&upload.storage_name(), &upload.bytes)
                    .await?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Drop an upload whose post was never written.
    async fn discard_image(&self, path: Option<&str>) {
        let Some(path) = path else {
            return;
        };
        if let Err(e) = self.media.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to remove orphaned upload");
        }
    }
}
