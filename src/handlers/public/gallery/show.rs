// handlers/public/gallery/show.rs - GET /gallery/:slug handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /gallery/:slug - gallery metadata with its photos.
///
/// Studio-hosted galleries are returned exactly as the studio sent them;
/// legacy galleries are built from the local database, newest photo first.
pub async fn gallery_get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let resolved = state.galleries.resolve_gallery(&slug).await?;
    Ok(Json(resolved.body))
}
