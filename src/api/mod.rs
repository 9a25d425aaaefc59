/// API routes and handlers
pub mod blobs;
pub mod feed;
pub mod photos;
pub mod session;
pub mod texts;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(session::routes())
        .merge(photos::routes())
        .merge(feed::routes())
        .merge(blobs::routes())
        .merge(texts::routes())
}
