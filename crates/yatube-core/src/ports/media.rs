//! Media storage port - where uploaded post images end up.

use async_trait::async_trait;

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `bytes` under `name` (a path relative to the media root, e.g.
    /// `posts/cat.gif`) and return the path actually used. When the name is
    /// taken a suffix is added rather than overwriting.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, MediaError>;

    /// Read a stored file back. `Ok(None)` when nothing is stored there.
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError>;

    /// Remove a stored file. Removing a missing file is not an error.
    async fn delete(&self, path: &str) -> Result<(), MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
