use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{ContentItem, DraftStore, StoreError};

/// File-backed draft store: one JSON snapshot per section under a
/// configured directory.
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, section: &str) -> PathBuf {
        self.dir.join(format!("{section}.json"))
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn load(&self, section: &str) -> Result<Option<Vec<ContentItem>>, StoreError> {
        match tokio::fs::read(self.path(section)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, section: &str, items: &[ContentItem]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(self.path(section), bytes).await?;
        debug!("Saved draft snapshot for section '{section}'");
        Ok(())
    }

    async fn discard(&self, section: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path(section)).await {
            Ok(()) => {
                debug!("Discarded draft snapshot for section '{section}'");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ItemId;
    use serde_json::json;

    fn item(id: ItemId) -> ContentItem {
        ContentItem {
            id,
            data: json!({"name": "Rust"}),
            asset: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        assert!(store.load("skills").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        let items = vec![item(ItemId::synthetic("skills", 0))];
        store.save("skills", &items).await.unwrap();

        let loaded = store.load("skills").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, ItemId::synthetic("skills", 0));
        assert_eq!(loaded[0].data["name"], "Rust");
    }

    #[tokio::test]
    async fn test_discard_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        store.save("skills", &[item(ItemId::synthetic("skills", 0))]).await.unwrap();

        store.discard("skills").await.unwrap();
        assert!(store.load("skills").await.unwrap().is_none());
        // Discarding an absent snapshot is not an error.
        store.discard("skills").await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshots_are_per_section() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        store.save("skills", &[item(ItemId::synthetic("skills", 0))]).await.unwrap();
        assert!(store.load("projects").await.unwrap().is_none());
    }
}
