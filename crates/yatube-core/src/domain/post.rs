use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters a post renders to in listings and logs.
pub const LETTERS_PER_POST: usize = 15;

/// Post entity - a text entry by one author, optionally filed under a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// Set once when the post is created; edits never touch it.
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    /// Path of the attached image relative to the media root.
    pub image: Option<String>,
}

impl Post {
    /// First `letters` characters of the text.
    pub fn preview(&self, letters: usize) -> String {
        self.text.chars().take(letters).collect()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview(LETTERS_PER_POST))
    }
}

/// Fields needed to publish a post; id and `pub_date` are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

/// Which posts a feed shows. Every variant is ordered newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// The global index.
    All,
    /// Posts filed under one group.
    Group(i64),
    /// Posts written by one author.
    Author(i64),
    /// Posts by every author the given user follows.
    FollowedBy(i64),
}

impl PostFilter {
    /// Whether a post belongs to this feed, given the authors `follows` returns
    /// for the follower. Used by stores that filter in process.
    pub fn matches(&self, post: &Post, follows: impl Fn(i64, i64) -> bool) -> bool {
        match *self {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => follows(user_id, post.author_id),
        }
    }
}
