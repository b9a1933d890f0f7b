//! Feed queries: index, group, profile, following and post detail pages.

use std::collections::HashMap;

use serde::Serialize;

use super::Repositories;
use crate::domain::{Comment, Group, Post, PostFilter, User};
use crate::error::DomainError;
use crate::pagination::{Page, Paginator};

/// Group summary shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

/// A post as listed in a feed.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    #[serde(flatten)]
    pub post: Post,
    pub author: String,
    pub group: Option<GroupRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentCard {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    pub author: User,
    pub post_count: u64,
    /// Whether the viewer follows this author.
    pub following: bool,
    pub page: Page<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostCard,
    pub author_post_count: u64,
    pub comments: Vec<CommentCard>,
}

#[derive(Clone)]
pub struct FeedService {
    repos: Repositories,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(repos: Repositories, paginator: Paginator) -> Self {
        Self { repos, paginator }
    }

    /// Every post, newest first.
    pub async fn index(&self, page: Option<&str>) -> Result<Page<PostCard>, DomainError> {
        self.page(PostFilter::All, page).await
    }

    pub async fn group(&self, slug: &str, page: Option<&str>) -> Result<GroupFeed, DomainError> {
        let group = self
            .repos
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;
        let page = self.page(PostFilter::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer_id: Option<i64>,
        page: Option<&str>,
    ) -> Result<ProfileFeed, DomainError> {
        let author = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let following = match viewer_id {
            Some(viewer) if viewer != author.id => {
                self.repos.follows.exists(viewer, author.id).await?
            }
            _ => false,
        };
        let page = self.page(PostFilter::Author(author.id), page).await?;

        Ok(ProfileFeed {
            post_count: page.count,
            author,
            following,
            page,
        })
    }

    /// Posts by the authors `user_id` follows.
    pub async fn following(
        &self,
        user_id: i64,
        page: Option<&str>,
    ) -> Result<Page<PostCard>, DomainError> {
        self.page(PostFilter::FollowedBy(user_id), page).await
    }

    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetail, DomainError> {
        let post = self
            .repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let author_post_count = self
            .repos
            .posts
            .count(PostFilter::Author(post.author_id))
            .await?;

        let comments = self.repos.comments.find_by_post(post.id).await?;
        let mut author_ids: Vec<i64> = comments.iter().map(|c| c.author_id).collect();
        author_ids.push(post.author_id);
        let usernames = self.usernames(&author_ids).await?;

        let comments = comments
            .into_iter()
            .map(|comment| CommentCard {
                author: usernames.get(&comment.author_id).cloned().unwrap_or_default(),
                comment,
            })
            .collect();

        let post = self
            .cards(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("post card vanished".to_string()))?;

        Ok(PostDetail {
            post,
            author_post_count,
            comments,
        })
    }

    async fn page(
        &self,
        filter: PostFilter,
        requested: Option<&str>,
    ) -> Result<Page<PostCard>, DomainError> {
        let count = self.repos.posts.count(filter).await?;
        let window = self.paginator.window(count, requested);
        let posts = self
            .repos
            .posts
            .list(filter, window.offset, window.limit)
            .await?;
        tracing::debug!(
            ?filter,
            page = window.number,
            num_pages = window.num_pages,
            rows = posts.len(),
            "Loaded feed page"
        );
        Ok(Page::new(window, self.cards(posts).await?))
    }

    /// Attach author usernames and group titles with one lookup each.
    async fn cards(&self, posts: Vec<Post>) -> Result<Vec<PostCard>, DomainError> {
        let author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        let mut group_ids: Vec<i64> = posts.iter().filter_map(|p| p.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let usernames = self.usernames(&author_ids).await?;
        let groups: HashMap<i64, GroupRef> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.repos
                .groups
                .find_by_ids(&group_ids)
                .await?
                .into_iter()
                .map(|g| {
                    (
                        g.id,
                        GroupRef {
                            slug: g.slug,
                            title: g.title,
                        },
                    )
                })
                .collect()
        };

        Ok(posts
            .into_iter()
            .map(|post| PostCard {
                author: usernames.get(&post.author_id).cloned().unwrap_or_default(),
                group: post.group_id.and_then(|id| groups.get(&id).cloned()),
                post,
            })
            .collect())
    }

    async fn usernames(&self, ids: &[i64]) -> Result<HashMap<i64, String>, DomainError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .repos
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect())
    }
}
