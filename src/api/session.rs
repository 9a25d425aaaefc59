/// Session entry and exit endpoints
use crate::{
    auth::{bearer_token, Session},
    context::AppContext,
    error::{GalleryError, GalleryResult},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/session", post(open_session).delete(close_session))
}

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub passphrase: String,
}

/// Exchange a passphrase for a session token
async fn open_session(
    State(ctx): State<AppContext>,
    Json(request): Json<OpenSessionRequest>,
) -> GalleryResult<Json<Session>> {
    let session = ctx.sessions.login(&request.passphrase).await?;
    Ok(Json(session))
}

/// Drop the calling session
async fn close_session(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> GalleryResult<StatusCode> {
    let token = bearer_token(&headers).ok_or_else(|| {
        GalleryError::Authentication("Missing authorization header".to_string())
    })?;

    ctx.sessions.logout(&token).await;

    Ok(StatusCode::NO_CONTENT)
}
