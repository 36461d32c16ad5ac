// handlers/public/gallery/download.rs - GET /gallery/:slug/download handler

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tokio::sync::mpsc;

use crate::error::ApiError;
use crate::media::{archive_filename, content_disposition, stream_archive};
use crate::state::AppState;

/// Chunks buffered between the archive task and the response body
const ARCHIVE_CHANNEL_CAPACITY: usize = 8;

/// GET /gallery/:slug/download - every photo of the gallery as one ZIP.
///
/// Resolution errors (404 unknown gallery, 400 no photos) are returned before
/// any body is sent. Once streaming starts the status is always 200; photos
/// that cannot be fetched are simply missing from the archive.
pub async fn gallery_download(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    let resolved = state.galleries.resolve_gallery_for_download(&slug).await?;
    let filename = archive_filename(&resolved.name);

    let (tx, rx) = mpsc::channel(ARCHIVE_CHANNEL_CAPACITY);
    let body = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (chunk, rx))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(body))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build archive response");
            ApiError::internal_server_error("Failed to start download")
        })?;

    tracing::info!(slug = %slug, photos = resolved.photos.len(), source = ?resolved.source, "starting gallery archive");
    let fetcher = state.fetcher.clone();
    tokio::spawn(async move {
        stream_archive(&fetcher, &resolved.name, &resolved.photos, tx).await;
    });

    Ok(response)
}
