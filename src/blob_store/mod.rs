/// Blob Storage System
///
/// Handles the binary image payloads behind the cloud-variant photo
/// documents. Backends are swappable behind one trait.

pub mod disk;

pub use disk::DiskBlobBackend;

use crate::error::GalleryResult;
use async_trait::async_trait;

/// Blob storage backend trait
///
/// Implementations handle the actual storage and retrieval of blob data,
/// keyed by a generated name.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store a blob under the given name
    async fn put(&self, name: &str, data: Vec<u8>) -> GalleryResult<()>;

    /// Retrieve a blob by name
    async fn get(&self, name: &str) -> GalleryResult<Option<Vec<u8>>>;

    /// Delete a blob by name; deleting a missing blob is not an error
    async fn delete(&self, name: &str) -> GalleryResult<()>;

    /// Check if a blob exists
    async fn exists(&self, name: &str) -> GalleryResult<bool>;
}
