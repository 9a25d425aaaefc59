/// Local single-document photo store
///
/// The whole collection lives in one serialized JSON document, each record
/// carrying its image inline as a base64 data URL. A byte quota bounds the
/// document the way a browser storage key is bounded; a write that would
/// exceed it fails without touching the previously stored collection.
use crate::{
    compress::CompressedImage,
    error::{GalleryError, GalleryResult},
    store::{sort_newest_first, PhotoRecord, PhotoStore, StoreEvent},
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use std::path::PathBuf;
use tokio::{
    fs,
    sync::{broadcast, Mutex},
};
use uuid::Uuid;

/// Local key-value photo store
pub struct LocalStore {
    collection_path: PathBuf,
    quota_bytes: usize,
    // Serializes read-modify-write cycles on the single document
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create a new local store persisting at `collection_path`
    pub fn new(collection_path: PathBuf, quota_bytes: usize) -> Self {
        Self {
            collection_path,
            quota_bytes,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the stored collection; a missing document is an empty one
    async fn load(&self) -> GalleryResult<Vec<PhotoRecord>> {
        match fs::read(&self.collection_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                GalleryError::Internal(format!("Corrupt photo collection: {}", e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(GalleryError::Internal(format!(
                "Failed to read photo collection: {}",
                e
            ))),
        }
    }

    /// Persist the full collection, all-or-nothing
    ///
    /// The document is serialized up front and checked against the quota
    /// before any bytes hit disk; the swap itself is a temp-file write
    /// followed by an atomic rename, so a failed save leaves the prior
    /// state untouched.
    async fn persist(&self, photos: &[PhotoRecord]) -> GalleryResult<()> {
        let json = serde_json::to_vec(photos)
            .map_err(|e| GalleryError::Internal(format!("Failed to serialize collection: {}", e)))?;

        if json.len() > self.quota_bytes {
            return Err(GalleryError::StoreWrite(format!(
                "Collection would be {} bytes, quota is {}",
                json.len(),
                self.quota_bytes
            )));
        }

        if let Some(parent) = self.collection_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                GalleryError::StoreWrite(format!("Failed to create data directory: {}", e))
            })?;
        }

        let tmp_path = self.collection_path.with_extension("tmp");
        fs::write(&tmp_path, &json)
            .await
            .map_err(|e| GalleryError::StoreWrite(format!("Failed to write collection: {}", e)))?;
        fs::rename(&tmp_path, &self.collection_path)
            .await
            .map_err(|e| GalleryError::StoreWrite(format!("Failed to commit collection: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl PhotoStore for LocalStore {
    async fn create(&self, image: CompressedImage) -> GalleryResult<PhotoRecord> {
        let _guard = self.write_lock.lock().await;

        let date = Utc::now();
        let record = PhotoRecord {
            id: Uuid::new_v4().to_string(),
            image_ref: format!(
                "data:image/jpeg;base64,{}",
                general_purpose::STANDARD.encode(&image.data)
            ),
            date,
            created_at: date.timestamp_millis(),
        };

        let mut photos = self.load().await?;
        photos.insert(0, record.clone());
        self.persist(&photos).await?;

        tracing::info!("Stored photo {} inline ({} bytes)", record.id, image.data.len());

        Ok(record)
    }

    async fn list(&self) -> GalleryResult<Vec<PhotoRecord>> {
        let mut photos = self.load().await?;
        sort_newest_first(&mut photos);
        Ok(photos)
    }

    async fn delete(&self, id: &str) -> GalleryResult<()> {
        let _guard = self.write_lock.lock().await;

        let photos = self.load().await?;
        let remaining: Vec<PhotoRecord> = photos.iter().filter(|p| p.id != id).cloned().collect();

        if remaining.len() == photos.len() {
            return Err(GalleryError::NotFound(format!("Photo not found: {}", id)));
        }

        self.persist(&remaining).await?;

        tracing::info!("Deleted photo {}", id);

        Ok(())
    }

    fn watch(&self) -> Option<broadcast::Receiver<StoreEvent>> {
        // No push channel; consumers poll with list()
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_image(bytes: usize) -> CompressedImage {
        CompressedImage {
            data: vec![0xAB; bytes],
            width: 10,
            height: 10,
        }
    }

    fn test_store(dir: &tempfile::TempDir, quota: usize) -> LocalStore {
        LocalStore::new(dir.path().join("photos.json"), quota)
    }

    #[tokio::test]
    async fn test_empty_store_lists_empty() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024 * 1024);

        let photos = store.list().await.unwrap();
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn test_create_adds_one_record() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024 * 1024);

        let before = store.list().await.unwrap().len();
        let record = store.create(test_image(64)).await.unwrap();
        let after = store.list().await.unwrap();

        assert_eq!(after.len(), before + 1);
        assert!(after.iter().any(|p| p.id == record.id));
        assert!(record.image_ref.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024 * 1024);

        let mut ids = std::collections::HashSet::new();
        for _ in 0..10 {
            let record = store.create(test_image(16)).await.unwrap();
            assert!(ids.insert(record.id));
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024 * 1024);

        let first = store.create(test_image(16)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = store.create(test_image(16)).await.unwrap();

        let photos = store.list().await.unwrap();
        assert_eq!(photos[0].id, second.id);
        assert_eq!(photos[1].id, first.id);
        assert!(photos[0].created_at >= photos[1].created_at);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024 * 1024);

        let keep = store.create(test_image(16)).await.unwrap();
        let target = store.create(test_image(16)).await.unwrap();

        store.delete(&target.id).await.unwrap();

        let photos = store.list().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024 * 1024);

        let record = store.create(test_image(16)).await.unwrap();

        let result = store.delete("no-such-id").await;
        assert!(matches!(result, Err(GalleryError::NotFound(_))));

        // Collection unchanged
        let photos = store.list().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, record.id);
    }

    #[tokio::test]
    async fn test_quota_overflow_leaves_prior_state_untouched() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 900);

        // Fits comfortably under the quota
        let kept = store.create(test_image(64)).await.unwrap();

        // Base64 inflation pushes this one over
        let result = store.create(test_image(4096)).await;
        assert!(matches!(result, Err(GalleryError::StoreWrite(_))));

        let photos = store.list().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_collection_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photos.json");

        let record = {
            let store = LocalStore::new(path.clone(), 1024 * 1024);
            store.create(test_image(32)).await.unwrap()
        };

        let reopened = LocalStore::new(path, 1024 * 1024);
        let photos = reopened.list().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, record.id);
    }

    #[tokio::test]
    async fn test_local_store_has_no_push_channel() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir, 1024);
        assert!(store.watch().is_none());
    }
}
