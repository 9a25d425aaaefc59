/// Application context and dependency injection
use crate::{
    auth::SessionManager,
    blob_store::{BlobBackend, DiskBlobBackend},
    config::{GalleryConfig, StoreBackendConfig},
    db,
    error::GalleryResult,
    store::{CloudStore, LocalStore, PhotoStore},
    sync::Synchronizer,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GalleryConfig>,
    pub store: Arc<dyn PhotoStore>,
    /// Present only for the cloud variant; backs the /blobs routes
    pub blobs: Option<Arc<dyn BlobBackend>>,
    pub sync: Arc<Synchronizer>,
    pub sessions: Arc<SessionManager>,
    /// Single-flight guard for the upload pipeline
    pub upload_gate: Arc<Mutex<()>>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: GalleryConfig) -> GalleryResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Build the configured store variant
        let (store, blobs): (Arc<dyn PhotoStore>, Option<Arc<dyn BlobBackend>>) =
            match &config.storage.backend {
                StoreBackendConfig::Local {
                    collection_path,
                    quota_bytes,
                } => {
                    tracing::info!(
                        "Using local store at {:?} ({} byte quota)",
                        collection_path,
                        quota_bytes
                    );
                    (
                        Arc::new(LocalStore::new(collection_path.clone(), *quota_bytes)),
                        None,
                    )
                }
                StoreBackendConfig::Cloud {
                    document_db,
                    blob_directory,
                } => {
                    tracing::info!(
                        "Using cloud store at {:?} with blobs in {:?}",
                        document_db,
                        blob_directory
                    );
                    let pool =
                        db::create_pool(document_db, db::DatabaseOptions::default()).await?;
                    db::test_connection(&pool).await?;

                    let blobs: Arc<dyn BlobBackend> =
                        Arc::new(DiskBlobBackend::new(blob_directory.clone()));
                    let store =
                        CloudStore::new(pool, blobs.clone(), config.service.public_url.clone())
                            .await?;
                    (Arc::new(store), Some(blobs))
                }
            };

        // Synchronizer picks poll or push mode off the store
        let sync = Arc::new(Synchronizer::new(store.clone()));

        let sessions = Arc::new(SessionManager::new(
            config.gate.visitor_pass.clone(),
            config.gate.admin_pass.clone(),
            config.gate.session_ttl_secs,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            blobs,
            sync,
            sessions,
            upload_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &GalleryConfig) -> GalleryResult<()> {
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        }

        if let StoreBackendConfig::Cloud { blob_directory, .. } = &config.storage.backend {
            tokio::fs::create_dir_all(blob_directory).await?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        self.config.service.public_url.clone()
    }
}
