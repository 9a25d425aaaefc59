/// Gallery synchronizer
///
/// Keeps the in-memory photo list consistent with the backing store. With
/// a poll-only store the list is re-derived on demand; with a push-capable
/// store a pump task consumes change notifications and fans full
/// replacement snapshots out to every open subscription.
use crate::{
    error::{GalleryError, GalleryResult},
    metrics,
    store::{PhotoRecord, PhotoStore, StoreEvent},
};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const FEED_BUFFER: usize = 32;

/// Synchronization mode, chosen by the active store variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Re-fetch on view entry and after each local mutation
    Poll,
    /// Standing subscription pushing full snapshots on any remote change
    Push,
}

/// Event delivered to snapshot subscribers
///
/// A lost subscription is its own event, never an empty snapshot.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Snapshot(Vec<PhotoRecord>),
    Lost(String),
}

/// Gallery synchronizer over one photo store
pub struct Synchronizer {
    store: Arc<dyn PhotoStore>,
    mode: SyncMode,
    snapshot: Arc<RwLock<Vec<PhotoRecord>>>,
    feed_tx: Option<broadcast::Sender<FeedEvent>>,
}

impl Synchronizer {
    /// Create a synchronizer; push mode spawns the snapshot pump
    pub fn new(store: Arc<dyn PhotoStore>) -> Self {
        let snapshot = Arc::new(RwLock::new(Vec::new()));

        match store.watch() {
            Some(events) => {
                let (feed_tx, _) = broadcast::channel(FEED_BUFFER);
                tokio::spawn(pump(
                    store.clone(),
                    events,
                    feed_tx.clone(),
                    snapshot.clone(),
                ));
                Self {
                    store,
                    mode: SyncMode::Push,
                    snapshot,
                    feed_tx: Some(feed_tx),
                }
            }
            None => Self {
                store,
                mode: SyncMode::Poll,
                snapshot,
                feed_tx: None,
            },
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Re-derive the list from the store and return it
    pub async fn refresh(&self) -> GalleryResult<Vec<PhotoRecord>> {
        let photos = self.store.list().await?;
        metrics::PHOTOS_STORED.set(photos.len() as i64);
        *self.snapshot.write().await = photos.clone();
        Ok(photos)
    }

    /// Last known list without touching the store
    pub async fn current(&self) -> Vec<PhotoRecord> {
        self.snapshot.read().await.clone()
    }

    /// Open a snapshot subscription (push mode only)
    ///
    /// The feed yields the current collection immediately, then one full
    /// replacement snapshot per store change until it is dropped.
    pub async fn subscribe(&self) -> GalleryResult<SnapshotFeed> {
        let feed_tx = self.feed_tx.as_ref().ok_or_else(|| {
            GalleryError::Subscription(
                "Active store has no push channel; poll with refresh()".to_string(),
            )
        })?;

        let events = feed_tx.subscribe();
        let initial = self.refresh().await?;

        Ok(SnapshotFeed {
            initial: Some(initial),
            events,
        })
    }
}

/// Consume store change notifications and broadcast fresh snapshots
async fn pump(
    store: Arc<dyn PhotoStore>,
    mut events: broadcast::Receiver<StoreEvent>,
    feed_tx: broadcast::Sender<FeedEvent>,
    snapshot: Arc<RwLock<Vec<PhotoRecord>>>,
) {
    loop {
        match events.recv().await {
            // A lagged receiver is fine: the fresh list supersedes
            // whatever notifications were missed
            Ok(StoreEvent::Changed) | Err(broadcast::error::RecvError::Lagged(_)) => {
                match store.list().await {
                    Ok(photos) => {
                        metrics::PHOTOS_STORED.set(photos.len() as i64);
                        *snapshot.write().await = photos.clone();
                        let _ = feed_tx.send(FeedEvent::Snapshot(photos));
                    }
                    Err(e) => {
                        tracing::error!("Snapshot refresh failed: {}", e);
                        let _ = feed_tx.send(FeedEvent::Lost(e.to_string()));
                    }
                }
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::warn!("Store change stream closed, ending snapshot pump");
                let _ = feed_tx.send(FeedEvent::Lost("Change stream closed".to_string()));
                break;
            }
        }
    }
}

/// A cancellable snapshot subscription
///
/// Dropping the feed closes the subscription.
pub struct SnapshotFeed {
    initial: Option<Vec<PhotoRecord>>,
    events: broadcast::Receiver<FeedEvent>,
}

impl SnapshotFeed {
    /// Next event; `None` once the synchronizer itself has gone away
    pub async fn next(&mut self) -> Option<FeedEvent> {
        if let Some(photos) = self.initial.take() {
            return Some(FeedEvent::Snapshot(photos));
        }

        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                // Skipped snapshots are superseded by the next one
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        blob_store::{BlobBackend, DiskBlobBackend},
        compress::CompressedImage,
        store::{CloudStore, LocalStore},
    };
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::time::timeout;

    fn test_image() -> CompressedImage {
        CompressedImage {
            data: vec![0x42; 32],
            width: 10,
            height: 10,
        }
    }

    async fn cloud_store(dir: &tempfile::TempDir) -> CloudStore {
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

    async fn next_snapshot(feed: &mut SnapshotFeed) -> Vec<PhotoRecord> {
        match timeout(Duration::from_secs(5), feed.next()).await {
            Ok(Some(FeedEvent::Snapshot(photos))) => photos,
            other => panic!("expected snapshot, got {:?}", other.map(|e| e.is_some())),
        }
    }

    #[tokio::test]
    async fn test_local_store_selects_poll_mode() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("photos.json"), 1024 * 1024));
        let sync = Synchronizer::new(store);

        assert_eq!(sync.mode(), SyncMode::Poll);
    }

    #[tokio::test]
    async fn test_poll_mode_refresh_reflects_mutations() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("photos.json"), 1024 * 1024));
        let sync = Synchronizer::new(store.clone());

        assert!(sync.refresh().await.unwrap().is_empty());

        let record = store.create(test_image()).await.unwrap();
        let photos = sync.refresh().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, record.id);
        assert_eq!(sync.current().await.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_mode_has_no_subscription() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("photos.json"), 1024 * 1024));
        let sync = Synchronizer::new(store);

        let result = sync.subscribe().await;
        assert!(matches!(result.err(), Some(GalleryError::Subscription(_))));
    }

    #[tokio::test]
    async fn test_push_mode_delivers_initial_snapshot() {
        let dir = tempdir().unwrap();
        let store = Arc::new(cloud_store(&dir).await);
        store.create(test_image()).await.unwrap();

        let sync = Synchronizer::new(store);
        assert_eq!(sync.mode(), SyncMode::Push);

        let mut feed = sync.subscribe().await.unwrap();
        let photos = next_snapshot(&mut feed).await;
        assert_eq!(photos.len(), 1);
    }

    #[tokio::test]
    async fn test_push_mode_streams_snapshot_per_change() {
        let dir = tempdir().unwrap();
        let store = Arc::new(cloud_store(&dir).await);
        let sync = Synchronizer::new(store.clone());

        let mut feed = sync.subscribe().await.unwrap();
        assert!(next_snapshot(&mut feed).await.is_empty());

        let record = store.create(test_image()).await.unwrap();
        let photos = next_snapshot(&mut feed).await;
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, record.id);
    }

    #[tokio::test]
    async fn test_remote_delete_reaches_open_subscription() {
        // A second client deleting through its own store handle must show
        // up in the first client's feed without an explicit list() call
        let dir = tempdir().unwrap();
        let store = Arc::new(cloud_store(&dir).await);
        let second_client = store.clone();

        let record = store.create(test_image()).await.unwrap();

        let sync = Synchronizer::new(store);
        let mut feed = sync.subscribe().await.unwrap();
        assert_eq!(next_snapshot(&mut feed).await.len(), 1);

        second_client.delete(&record.id).await.unwrap();

        let photos = next_snapshot(&mut feed).await;
        assert!(photos.iter().all(|p| p.id != record.id));
        assert!(photos.is_empty());
    }
}
