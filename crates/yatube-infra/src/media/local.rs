use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use yatube_core::ports::{MediaError, MediaStorage};

use super::{relative_path, to_key, with_suffix};

/// How many fresh names to try before giving up on a crowded directory.
const MAX_RENAMES: usize = 8;

/// Files under a directory on local disk (`MEDIA_ROOT`).
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let mut relative = relative_path(name)?;
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }

        for _ in 0..MAX_RENAMES {
            // create_new never clobbers an existing upload.
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&relative))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .await
                        .map_err(|e| MediaError::Io(e.to_string()))?;
                    file.flush()
                        .await
                        .map_err(|e| MediaError::Io(e.to_string()))?;

                    let stored = to_key(&relative);
                    tracing::debug!(path = %stored, size = bytes.len(), "Stored media file");
                    return Ok(stored);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    relative = with_suffix(&relative_path(name)?);
                }
                Err(e) => return Err(MediaError::Io(e.to_string())),
            }
        }

        Err(MediaError::Io(format!("no free file name for {name}")))
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError> {
        let relative = relative_path(path)?;
        match tokio::fs::read(self.root.join(relative)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), MediaError> {
        let relative = relative_path(path)?;
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => {
                tracing::debug!(path, "Removed media file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
