/// Localized UI text endpoint
use crate::{
    context::AppContext,
    error::{GalleryError, GalleryResult},
    i18n::{self, Lang, Texts},
};
use axum::{extract::Path, routing::get, Json, Router};

/// Build text catalog routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/texts/:lang", get(get_texts))
}

/// Full UI string catalog for one language
async fn get_texts(Path(lang): Path<String>) -> GalleryResult<Json<&'static Texts>> {
    let lang = Lang::parse(&lang)
        .ok_or_else(|| GalleryError::NotFound(format!("Unsupported language: {}", lang)))?;

    Ok(Json(i18n::texts(lang)))
}
