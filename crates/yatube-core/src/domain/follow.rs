use serde::{Deserialize, Serialize};

use super::User;

/// Directed subscription edge: `user_id` follows `author_id`.
///
/// The pair is unique in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub user_id: i64,
    pub author_id: i64,
}

impl Follow {
    pub fn new(user_id: i64, author_id: i64) -> Self {
        Self { user_id, author_id }
    }

    /// Human readable form, e.g. `"alice follows bob"`.
    pub fn describe(&self, user: &User, author: &User) -> String {
        debug_assert_eq!(user.id, self.user_id);
        debug_assert_eq!(author.id, self.author_id);
        format!("{} follows {}", user.username, author.username)
    }
}
