use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Gallery, GalleryRow, Photo};

/// Read-only access to galleries still homed in the legacy database
#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn find_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, DatabaseError>;

    /// Photos of a gallery, newest first
    async fn list_photos(&self, gallery_id: Uuid) -> Result<Vec<Photo>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

pub struct PgGalleryStore {
    pool: PgPool,
}

impl PgGalleryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GalleryStore for PgGalleryStore {
    async fn find_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, DatabaseError> {
        let row = sqlx::query_as::<_, GalleryRow>(
            r#"
            SELECT id, name, slug, event_date, subheading, status,
                   header_media_url, header_media_type
            FROM clients
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Gallery::from))
    }

    async fn list_photos(&self, gallery_id: Uuid) -> Result<Vec<Photo>, DatabaseError> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, client_id, url, filename, public_id, created_at
            FROM photos
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(gallery_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
