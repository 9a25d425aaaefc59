/// Photo store adapters
///
/// One interface over two backing stores: a single serialized local
/// document with inline payloads, and a document table backed by blob
/// storage with a change-notification channel.

pub mod cloud;
pub mod local;

pub use cloud::CloudStore;
pub use local::LocalStore;

use crate::{compress::CompressedImage, error::GalleryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The canonical stored representation of one gallery image
///
/// `image_ref` is either an inline data URL (local variant) or an HTTP URL
/// resolving to blob storage (cloud variant). Records are write-once:
/// every field is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: String,
    pub image_ref: String,
    pub date: DateTime<Utc>,
    pub created_at: i64,
}

/// Change notification emitted by push-capable stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed,
}

/// Backing store interface for the photo collection
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist a new record, assigning id and creation time
    async fn create(&self, image: CompressedImage) -> GalleryResult<PhotoRecord>;

    /// All records, sorted descending by creation time; an empty store
    /// yields an empty vec
    async fn list(&self) -> GalleryResult<Vec<PhotoRecord>>;

    /// Remove exactly one record by id
    async fn delete(&self, id: &str) -> GalleryResult<()>;

    /// Change-notification channel, present only for stores that can push
    fn watch(&self) -> Option<broadcast::Receiver<StoreEvent>>;
}

/// Sort records into canonical display order
///
/// Descending by creation time; the stable sort keeps tied entries in
/// their stored order relative to non-tied ones.
pub(crate) fn sort_newest_first(photos: &mut [PhotoRecord]) {
    photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
