/// Photo collection endpoints: list, upload, delete
use crate::{
    auth::{AdminContext, ViewerContext},
    compress,
    context::AppContext,
    error::{GalleryError, GalleryResult},
    metrics,
    store::{PhotoRecord, PhotoStore},
    sync::SyncMode,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

/// Build photo routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/photos", get(list_photos).post(upload_photo))
        .route("/photos/:id", delete(delete_photo))
}

/// Current collection, newest first
async fn list_photos(
    _viewer: ViewerContext,
    State(ctx): State<AppContext>,
) -> GalleryResult<Json<Vec<PhotoRecord>>> {
    let photos = ctx.sync.refresh().await?;
    Ok(Json(photos))
}

/// Upload one image: size gate, compress, persist
///
/// Accepts raw image bytes in the request body. A second upload while one
/// is in flight is rejected with Conflict; there is no way to abort an
/// upload once started.
async fn upload_photo(
    _admin: AdminContext,
    State(ctx): State<AppContext>,
    body: Bytes,
) -> GalleryResult<(StatusCode, Json<PhotoRecord>)> {
    let _in_flight = ctx.upload_gate.try_lock().map_err(|_| {
        metrics::UPLOADS_REJECTED_TOTAL.inc();
        GalleryError::Conflict("An upload is already in progress".to_string())
    })?;

    let upload = &ctx.config.upload;
    if body.len() > upload.max_upload_bytes {
        metrics::UPLOADS_REJECTED_TOTAL.inc();
        return Err(GalleryError::Validation(format!(
            "File is {} bytes, limit is {}",
            body.len(),
            upload.max_upload_bytes
        )));
    }

    let image = compress::compress(&body, upload.max_width, upload.jpeg_quality).map_err(|e| {
        metrics::UPLOADS_REJECTED_TOTAL.inc();
        e
    })?;

    let record = ctx.store.create(image).await?;
    metrics::UPLOADS_TOTAL.inc();

    // Push mode refreshes through the store's own change notification
    if ctx.sync.mode() == SyncMode::Poll {
        ctx.sync.refresh().await?;
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete one photo by id
///
/// The client owns the confirmation step; by the time this is called the
/// delete is final.
async fn delete_photo(
    _admin: AdminContext,
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> GalleryResult<Json<serde_json::Value>> {
    ctx.store.delete(&id).await?;
    metrics::DELETES_TOTAL.inc();

    if ctx.sync.mode() == SyncMode::Poll {
        ctx.sync.refresh().await?;
    }

    Ok(Json(serde_json::json!({ "deleted": id })))
}
