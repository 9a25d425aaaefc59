/// Disk-based blob storage backend
use crate::{
    blob_store::BlobBackend,
    error::{GalleryError, GalleryResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
///
/// Stores each blob as one file directly under the base directory. Names
/// are generated by the store (timestamp plus id fragment), so the
/// directory stays flat and predictable.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Resolve and validate the file path for a blob name
    ///
    /// Names are store-generated, but this endpoint is also reachable with
    /// caller-supplied names, so path traversal characters are rejected.
    fn blob_path(&self, name: &str) -> GalleryResult<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(GalleryError::Validation(format!(
                "Invalid blob name: {}",
                name
            )));
        }
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put(&self, name: &str, data: Vec<u8>) -> GalleryResult<()> {
        let blob_path = self.blob_path(name)?;

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            GalleryError::BlobStorage(format!("Failed to create blob directory: {}", e))
        })?;

        fs::write(&blob_path, data)
            .await
            .map_err(|e| GalleryError::BlobStorage(format!("Failed to write blob {}: {}", name, e)))?;

        Ok(())
    }

    async fn get(&self, name: &str) -> GalleryResult<Option<Vec<u8>>> {
        let blob_path = self.blob_path(name)?;

        match fs::read(&blob_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GalleryError::BlobStorage(format!(
                "Failed to read blob {}: {}",
                name, e
            ))),
        }
    }

    async fn delete(&self, name: &str) -> GalleryResult<()> {
        let blob_path = self.blob_path(name)?;

        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GalleryError::BlobStorage(format!(
                "Failed to delete blob {}: {}",
                name, e
            ))),
        }
    }

    async fn exists(&self, name: &str) -> GalleryResult<bool> {
        let blob_path = self.blob_path(name)?;
        Ok(blob_path.exists())
    }
}
