/// Cloud document + blob photo store
///
/// Photo metadata lives in a `photos` document table queried newest-first;
/// the compressed bytes live in blob storage under a generated
/// timestamp-based name. Every committed mutation is announced on a
/// broadcast channel so open subscriptions can re-derive their snapshot.
use crate::{
    blob_store::BlobBackend,
    compress::CompressedImage,
    error::{GalleryError, GalleryResult},
    store::{PhotoRecord, PhotoStore, StoreEvent},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_BUFFER: usize = 64;

/// Cloud-variant photo store
#[derive(Clone)]
pub struct CloudStore {
    db: SqlitePool,
    blobs: Arc<dyn BlobBackend>,
    public_url: String,
    events: broadcast::Sender<StoreEvent>,
}

impl CloudStore {
    /// Create a new cloud store, initializing the document schema
    pub async fn new(
        db: SqlitePool,
        blobs: Arc<dyn BlobBackend>,
        public_url: String,
    ) -> GalleryResult<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS photos (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .map_err(GalleryError::Database)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_photos_created_at ON photos (created_at DESC)")
            .execute(&db)
            .await
            .map_err(GalleryError::Database)?;

        let (events, _) = broadcast::channel(EVENT_BUFFER);

        Ok(Self {
            db,
            blobs,
            public_url: public_url.trim_end_matches('/').to_string(),
            events,
        })
    }

    /// Generated blob name: creation timestamp plus an id fragment
    fn blob_name(created_at: i64, id: &str) -> String {
        format!("{}-{}.jpg", created_at, &id[..8])
    }

    /// Extract the blob name back out of a stored image URL
    fn blob_name_from_url(url: &str) -> Option<&str> {
        url.rsplit('/').next().filter(|name| !name.is_empty())
    }

    fn row_to_record(row: sqlx::sqlite::SqliteRow) -> GalleryResult<PhotoRecord> {
        let date_str: String = row.try_get("date")?;
        let date = DateTime::parse_from_rfc3339(&date_str)
            .map_err(|e| GalleryError::Internal(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(PhotoRecord {
            id: row.try_get("id")?,
            image_ref: row.try_get("url")?,
            date,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl PhotoStore for CloudStore {
    /// Two-phase create: blob upload first, then the metadata write
    ///
    /// A metadata failure after a successful blob write leaves the blob
    /// orphaned; that inconsistency is accepted and logged, never
    /// compensated.
    async fn create(&self, image: CompressedImage) -> GalleryResult<PhotoRecord> {
        let id = Uuid::new_v4().to_string();
        let date = Utc::now();
        let created_at = date.timestamp_millis();
        let name = Self::blob_name(created_at, &id);

        self.blobs
            .put(&name, image.data)
            .await
            .map_err(|e| GalleryError::StoreWrite(format!("Blob upload failed: {}", e)))?;

        let url = format!("{}/blobs/{}", self.public_url, name);

        let insert = sqlx::query(
            r#"
            INSERT INTO photos (id, url, date, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&id)
        .bind(&url)
        .bind(date.to_rfc3339())
        .bind(created_at)
        .execute(&self.db)
        .await;

        if let Err(e) = insert {
            tracing::warn!("Metadata write failed, blob {} is now orphaned: {}", name, e);
            return Err(GalleryError::StoreWrite(format!(
                "Metadata write rejected: {}",
                e
            )));
        }

        let _ = self.events.send(StoreEvent::Changed);

        tracing::info!("Stored photo {} at {}", id, url);

        Ok(PhotoRecord {
            id,
            image_ref: url,
            date,
            created_at,
        })
    }

    async fn list(&self) -> GalleryResult<Vec<PhotoRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, url, date, created_at
            FROM photos
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(GalleryError::Database)?;

        let mut photos = Vec::with_capacity(rows.len());
        for row in rows {
            photos.push(Self::row_to_record(row)?);
        }

        Ok(photos)
    }

    /// Delete the document, then best-effort delete the blob
    ///
    /// Blob removal failure is logged only; the metadata delete has
    /// already committed and is not rolled back.
    async fn delete(&self, id: &str) -> GalleryResult<()> {
        let row = sqlx::query("SELECT url FROM photos WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(GalleryError::Database)?;

        let Some(row) = row else {
            return Err(GalleryError::NotFound(format!("Photo not found: {}", id)));
        };
        let url: String = row.try_get("url")?;

        let result = sqlx::query("DELETE FROM photos WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| GalleryError::StoreDelete(format!("Delete rejected: {}", e)))?;

        if result.rows_affected() == 0 {
            // Lost a race with another client's delete
            return Err(GalleryError::NotFound(format!("Photo not found: {}", id)));
        }

        match Self::blob_name_from_url(&url) {
            Some(name) => {
                if let Err(e) = self.blobs.delete(name).await {
                    tracing::warn!("Best-effort blob delete failed for {}: {}", name, e);
                }
            }
            None => tracing::warn!("Could not derive blob name from url {}", url),
        }

        let _ = self.events.send(StoreEvent::Changed);

        tracing::info!("Deleted photo {}", id);

        Ok(())
    }

    fn watch(&self) -> Option<broadcast::Receiver<StoreEvent>> {
        Some(self.events.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::DiskBlobBackend;
    use tempfile::tempdir;

    async fn create_test_store(dir: &tempfile::TempDir) -> CloudStore {
        // Single connection so the in-memory database is shared
        let db = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();

        let blobs: Arc<dyn BlobBackend> = Arc::new(DiskBlobBackend::new(dir.path().to_path_buf()));

        CloudStore::new(db, blobs, "http://localhost:8080".to_string())
            .await
            .unwrap()
    }

    fn test_image(bytes: usize) -> CompressedImage {
        CompressedImage {
            data: vec![0xCD; bytes],
            width: 10,
            height: 10,
        }
    }

    #[tokio::test]
    async fn test_empty_store_lists_empty() {
        let dir = tempdir().unwrap();
        let store = create_test_store(&dir).await;

        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_is_two_phase() {
        let dir = tempdir().unwrap();
        let store = create_test_store(&dir).await;

        let record = store.create(test_image(128)).await.unwrap();

        // Metadata row exists
        let photos = store.list().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, record.id);

        // Blob exists under the name referenced by the URL
        let name = CloudStore::blob_name_from_url(&record.image_ref).unwrap();
        assert!(store.blobs.exists(name).await.unwrap());
        assert!(record.image_ref.contains("/blobs/"));
    }

    #[tokio::test]
    async fn test_delete_removes_document_and_blob() {
        let dir = tempdir().unwrap();
        let store = create_test_store(&dir).await;

        let record = store.create(test_image(64)).await.unwrap();
        let name = CloudStore::blob_name_from_url(&record.image_ref)
            .unwrap()
            .to_string();

        store.delete(&record.id).await.unwrap();

        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.blobs.exists(&name).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = create_test_store(&dir).await;

        let record = store.create(test_image(64)).await.unwrap();

        let result = store.delete("no-such-id").await;
        assert!(matches!(result, Err(GalleryError::NotFound(_))));

        // Collection unchanged
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.list().await.unwrap()[0].id, record.id);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = tempdir().unwrap();
        let store = create_test_store(&dir).await;

        let first = store.create(test_image(16)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = store.create(test_image(16)).await.unwrap();

        let photos = store.list().await.unwrap();
        assert_eq!(photos[0].id, second.id);
        assert_eq!(photos[1].id, first.id);
    }

    #[tokio::test]
    async fn test_mutations_notify_watchers() {
        let dir = tempdir().unwrap();
        let store = create_test_store(&dir).await;

        let mut events = store.watch().unwrap();

        let record = store.create(test_image(16)).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::Changed);

        store.delete(&record.id).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), StoreEvent::Changed);
    }

    #[tokio::test]
    async fn test_blob_name_is_timestamp_based() {
        let name = CloudStore::blob_name(1722700000123, "abcdef12-3456-7890-abcd-ef1234567890");
        assert_eq!(name, "1722700000123-abcdef12.jpg");
    }
}
