use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{GalleryStatus, HeaderMediaType};

/// Raw `clients` row. Status and header type are free text in the legacy schema.
#[derive(Debug, Clone, FromRow)]
pub struct GalleryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub event_date: Option<NaiveDate>,
    pub subheading: Option<String>,
    pub status: Option<String>,
    pub header_media_url: Option<String>,
    pub header_media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub event_date: Option<NaiveDate>,
    pub subheading: Option<String>,
    #[serde(default)]
    pub status: GalleryStatus,
    pub header_media_url: Option<String>,
    pub header_media_type: Option<HeaderMediaType>,
}

impl From<GalleryRow> for Gallery {
    fn from(row: GalleryRow) -> Self {
        Self {
            status: GalleryStatus::from_db(row.status.as_deref()),
            header_media_type: HeaderMediaType::from_db(row.header_media_type.as_deref()),
            id: row.id,
            name: row.name,
            slug: row.slug,
            event_date: row.event_date,
            subheading: row.subheading,
            header_media_url: row.header_media_url,
        }
    }
}
