// handlers/public/photos/download.rs - GET /photos/download handler

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::media::{content_disposition, resolve_filename, FetchMiss};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PhotoDownloadQuery {
    pub url: Option<String>,
    pub filename: Option<String>,
    pub public_id: Option<String>,
    pub id: Option<String>,
}

/// GET /photos/download?url=...&filename=...&public_id=...&id=...
///
/// Streams a single asset back with an attachment disposition so browsers
/// save it instead of opening it. Shares the redirect and CDN-version
/// handling used for gallery archives. Every hop must be on an allowed host.
pub async fn photo_download(
    State(state): State<AppState>,
    Query(query): Query<PhotoDownloadQuery>,
) -> Result<Response, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("Photo URL is required"))?;

    Url::parse(url).map_err(|_| ApiError::bad_request("Invalid photo URL"))?;

    // Redirect targets are held to the same allow-list as the requested URL
    let allowed = &state.allowed_asset_hosts;
    let asset = match state
        .fetcher
        .fetch_stream_where(url, |hop| host_allowed(hop, allowed))
        .await
    {
        Ok(asset) => asset,
        Err(FetchMiss::HostNotAllowed(hop)) => {
            tracing::warn!(url = %url, hop = %hop, "photo download rejected: host not allowed");
            return Err(ApiError::bad_request("Photo host not allowed"));
        }
        Err(_) => return Err(ApiError::not_found("Photo not found")),
    };

    let filename = resolve_filename(
        query.filename.as_deref(),
        Some(url),
        query.public_id.as_deref(),
        query.id.as_deref(),
    );
    let content_type = asset
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from_stream(asset.into_stream()))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build photo response");
            ApiError::internal_server_error("Failed to start download")
        })
}

/// Exact host or any subdomain of an allowed host. Empty list allows all.
fn host_allowed(url: &Url, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    allowed.iter().any(|a| {
        let a = a.to_ascii_lowercase();
        host == a || host.ends_with(&format!(".{}", a))
    })
}
