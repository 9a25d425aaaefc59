/// Blob serving endpoint
///
/// Cloud-variant image references resolve here. Image tags cannot attach
/// session headers, so blob fetches are unauthenticated; gating is the
/// client's job, matching the rest of the entry model.
use crate::{
    blob_store::BlobBackend,
    context::AppContext,
    error::{GalleryError, GalleryResult},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

/// Build blob routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/blobs/:name", get(get_blob))
}

/// Serve stored blob bytes
///
/// Blob names are immutable once assigned, so responses cache forever.
async fn get_blob(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> GalleryResult<Response> {
    let blobs = ctx
        .blobs
        .as_ref()
        .ok_or_else(|| GalleryError::NotFound("Blob storage is not active".to_string()))?;

    let data = blobs
        .get(&name)
        .await?
        .ok_or_else(|| GalleryError::NotFound(format!("Blob not found: {}", name)))?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(data))
        .unwrap())
}
