/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Publication state of a gallery. Rows without a status are treated as active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GalleryStatus {
    #[default]
    Active,
    Archived,
}

impl GalleryStatus {
    /// Lenient parse for raw database values
    pub fn from_db(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            Some("ARCHIVED") => GalleryStatus::Archived,
            _ => GalleryStatus::Active,
        }
    }
}

/// Kind of media shown in a gallery header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMediaType {
    Image,
    Video,
}

impl HeaderMediaType {
    pub fn from_db(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("image") => Some(HeaderMediaType::Image),
            Some("video") => Some(HeaderMediaType::Video),
            _ => None,
        }
    }
}
