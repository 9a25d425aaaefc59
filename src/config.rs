/// Configuration management for Kouki Gallery
use crate::error::{GalleryError, GalleryResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    pub service: ServiceConfig,
    pub gate: GateConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Base URL baked into cloud-variant image references
    pub public_url: String,
}

/// Entry gating configuration
///
/// Two static passphrases, one for visitors and one for the administrator.
/// This is deliberately not a credential system: the values are shared,
/// unsalted, and visible to any client holding the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub visitor_pass: String,
    pub admin_pass: String,
    pub session_ttl_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub backend: StoreBackendConfig,
}

/// Backing store selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreBackendConfig {
    /// Whole collection as one serialized document with inline payloads
    Local {
        collection_path: PathBuf,
        quota_bytes: usize,
    },
    /// Document table plus binary blob storage
    Cloud {
        document_db: PathBuf,
        blob_directory: PathBuf,
    },
}

/// Upload pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Incoming files larger than this are rejected before decoding
    pub max_upload_bytes: usize,
    /// Pixel width bound for the compressor
    pub max_width: u32,
    /// Re-encoding quality in (0, 1]
    pub jpeg_quality: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl GalleryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GalleryResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GALLERY_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("GALLERY_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| GalleryError::Validation("Invalid port number".to_string()))?;
        let public_url = env::var("GALLERY_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));

        let visitor_pass = env::var("GALLERY_VISITOR_PASS").unwrap_or_else(|_| "0608".to_string());
        let admin_pass = env::var("GALLERY_ADMIN_PASS").unwrap_or_else(|_| "5341".to_string());
        let session_ttl_secs = env::var("GALLERY_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "43200".to_string())
            .parse()
            .unwrap_or(43200);

        let data_directory: PathBuf = env::var("GALLERY_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let backend_kind =
            env::var("GALLERY_STORE_BACKEND").unwrap_or_else(|_| "local".to_string());
        let backend = match backend_kind.as_str() {
            "local" => StoreBackendConfig::Local {
                collection_path: env::var("GALLERY_LOCAL_COLLECTION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("photos.json")),
                quota_bytes: env::var("GALLERY_LOCAL_QUOTA_BYTES")
                    .unwrap_or_else(|_| "5242880".to_string())
                    .parse()
                    .unwrap_or(5242880),
            },
            "cloud" => StoreBackendConfig::Cloud {
                document_db: env::var("GALLERY_DOCUMENT_DB")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("gallery.sqlite")),
                blob_directory: env::var("GALLERY_BLOB_DIRECTORY")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("blobs")),
            },
            other => {
                return Err(GalleryError::Validation(format!(
                    "Unknown store backend: {} (expected \"local\" or \"cloud\")",
                    other
                )))
            }
        };

        let max_upload_bytes = env::var("GALLERY_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "5242880".to_string())
            .parse()
            .unwrap_or(5242880);
        let max_width = env::var("GALLERY_MAX_WIDTH")
            .unwrap_or_else(|_| "800".to_string())
            .parse()
            .unwrap_or(800);
        let jpeg_quality = env::var("GALLERY_JPEG_QUALITY")
            .unwrap_or_else(|_| "0.6".to_string())
            .parse()
            .unwrap_or(0.6);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(GalleryConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
            },
            gate: GateConfig {
                visitor_pass,
                admin_pass,
                session_ttl_secs,
            },
            storage: StorageConfig {
                data_directory,
                backend,
            },
            upload: UploadConfig {
                max_upload_bytes,
                max_width,
                jpeg_quality,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GalleryResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GalleryError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.gate.visitor_pass.is_empty() || self.gate.admin_pass.is_empty() {
            return Err(GalleryError::Validation(
                "Passphrases cannot be empty".to_string(),
            ));
        }

        if self.gate.visitor_pass == self.gate.admin_pass {
            return Err(GalleryError::Validation(
                "Visitor and admin passphrases must differ".to_string(),
            ));
        }

        if self.upload.max_width == 0 {
            return Err(GalleryError::Validation(
                "Maximum width must be positive".to_string(),
            ));
        }

        if !(self.upload.jpeg_quality > 0.0 && self.upload.jpeg_quality <= 1.0) {
            return Err(GalleryError::Validation(
                "JPEG quality must be in (0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}
