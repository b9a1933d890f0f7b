//! Small documents embedded in or returned next to pages.

use serde::{Deserialize, Serialize};

/// The signed-in user, as shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `postgres` or `memory`.
    pub store: String,
    pub timestamp: String,
}
