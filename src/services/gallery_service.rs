use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::database::models::{Gallery, Photo, PhotoAsset};
use crate::database::{DatabaseError, GalleryStore};
use crate::services::studio_client::{StudioClient, StudioLookup};

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery not found: {0}")]
    NotFound(String),

    #[error("gallery has no photos to download: {0}")]
    NoPhotos(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GallerySource {
    Studio,
    Local,
}

/// A gallery resolved from either source.
/// `body` is what `GET /gallery/:slug` returns; `photos` drives downloads.
#[derive(Debug, Clone)]
pub struct ResolvedGallery {
    pub source: GallerySource,
    pub name: String,
    pub photos: Vec<PhotoAsset>,
    pub body: Value,
}

impl ResolvedGallery {
    fn from_studio(slug: &str, mut body: Value) -> Self {
        let photos = match body.get("photos") {
            Some(Value::Array(items)) => items.iter().map(PhotoAsset::from_json).collect(),
            _ => {
                body["photos"] = Value::Array(Vec::new());
                Vec::new()
            }
        };
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(slug)
            .to_string();

        Self {
            source: GallerySource::Studio,
            name,
            photos,
            body,
        }
    }

    fn from_local(gallery: Gallery, photos: Vec<Photo>) -> Result<Self, serde_json::Error> {
        let assets = photos.iter().map(PhotoAsset::from).collect();
        let name = gallery.name.clone();
        let body = serde_json::to_value(GalleryView { gallery, photos })?;

        Ok(Self {
            source: GallerySource::Local,
            name,
            photos: assets,
            body,
        })
    }

    pub fn has_downloadable_photos(&self) -> bool {
        self.photos.iter().any(PhotoAsset::has_url)
    }
}

#[derive(Serialize)]
struct GalleryView {
    #[serde(flatten)]
    gallery: Gallery,
    photos: Vec<Photo>,
}

/// Resolves galleries from the studio service first and the legacy
/// database second. Studio failures never fail the request.
#[derive(Clone)]
pub struct GalleryService {
    studio: StudioClient,
    store: Arc<dyn GalleryStore>,
}

impl GalleryService {
    pub fn new(studio: StudioClient, store: Arc<dyn GalleryStore>) -> Self {
        Self { studio, store }
    }

    pub async fn resolve_gallery(&self, slug: &str) -> Result<ResolvedGallery, GalleryError> {
        match self.studio.lookup_gallery(slug).await {
            StudioLookup::Hit(body) => {
                tracing::debug!(slug = %slug, "gallery served by studio service");
                return Ok(ResolvedGallery::from_studio(slug, body));
            }
            StudioLookup::Miss => {
                if self.studio.is_enabled() {
                    tracing::debug!(slug = %slug, "gallery not in studio service, using local store");
                }
            }
            StudioLookup::Error(reason) => {
                tracing::warn!(slug = %slug, reason = %reason, "studio lookup failed, falling back to local store");
            }
        }

        let Some(gallery) = self.store.find_gallery_by_slug(slug).await? else {
            tracing::info!(slug = %slug, "gallery not found");
            return Err(GalleryError::NotFound(slug.to_string()));
        };
        let photos = self.store.list_photos(gallery.id).await?;

        ResolvedGallery::from_local(gallery, photos).map_err(|e| {
            tracing::error!(slug = %slug, error = %e, "failed to serialize gallery");
            GalleryError::Internal(e.to_string())
        })
    }

    /// Like [`resolve_gallery`](Self::resolve_gallery), but rejects galleries
    /// with nothing to put in an archive.
    pub async fn resolve_gallery_for_download(&self, slug: &str) -> Result<ResolvedGallery, GalleryError> {
        let resolved = self.resolve_gallery(slug).await?;
        if !resolved.has_downloadable_photos() {
            tracing::warn!(slug = %slug, photos = resolved.photos.len(), "download requested for gallery without photos");
            return Err(GalleryError::NoPhotos(slug.to_string()));
        }
        Ok(resolved)
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.health_check().await
    }
}
