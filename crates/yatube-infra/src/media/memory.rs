use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::ports::{MediaError, MediaStorage};

use super::{relative_path, to_key, with_suffix};

/// Media kept in a map; for tests and servers without `MEDIA_ROOT`.
#[derive(Default)]
pub struct InMemoryMediaStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let relative = relative_path(name)?;
        let mut files = self.files.write().await;

        let mut key = to_key(&relative);
        while files.contains_key(&key) {
            key = to_key(&with_suffix(&relative));
        }
        files.insert(key.clone(), bytes.to_vec());
        Ok(key)
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError> {
        let key = to_key(&relative_path(path)?);
        Ok(self.files.read().await.get(&key).cloned())
    }

    async fn delete(&self, path: &str) -> Result<(), MediaError> {
        let key = to_key(&relative_path(path)?);
        self.files.write().await.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_saves_without_overwriting() {
        let storage = InMemoryMediaStorage::new();
        let first = storage.save("posts/a.png", b"1").await.unwrap();
        let second = storage.save("posts/a.png", b"2").await.unwrap();

        assert_eq!(first, "posts/a.png");
        assert_ne!(first, second);
        assert_eq!(storage.len().await, 2);
        assert_eq!(storage.read("posts/a.png").await.unwrap(), Some(b"1".to_vec()));
    }
}
