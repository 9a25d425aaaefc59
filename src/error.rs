/// Unified error types for Kouki Gallery
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the gallery service
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Uploaded bytes could not be interpreted as an image
    #[error("Image decode error: {0}")]
    Decode(String),

    /// Create rejected by the backing store (quota exceeded, rejected write)
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Delete rejected by the backing store
    #[error("Store delete error: {0}")]
    StoreDelete(String),

    /// Push channel lost or unavailable
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Blob storage errors
    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization errors
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g., an upload already in flight)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Convert GalleryError to HTTP response
impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            GalleryError::Decode(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidImage",
                self.to_string(),
            ),
            GalleryError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            GalleryError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            GalleryError::Authorization(_) => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                self.to_string(),
            ),
            GalleryError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
            ),
            GalleryError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Conflict",
                self.to_string(),
            ),
            GalleryError::StoreWrite(_) => (
                StatusCode::INSUFFICIENT_STORAGE,
                "StoreWriteError",
                self.to_string(),
            ),
            GalleryError::StoreDelete(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "StoreDeleteError",
                self.to_string(),
            ),
            GalleryError::Subscription(_) => (
                StatusCode::NOT_IMPLEMENTED,
                "SubscriptionUnavailable",
                self.to_string(),
            ),
            GalleryError::Database(_)
            | GalleryError::BlobStorage(_)
            | GalleryError::Internal(_)
            | GalleryError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorBody {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for gallery operations
pub type GalleryResult<T> = Result<T, GalleryError>;
