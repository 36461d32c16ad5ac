use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub client_id: Uuid,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The subset of a photo needed to place it in a download.
/// Built from local rows or from loosely-typed studio payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoAsset {
    pub id: Option<String>,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub public_id: Option<String>,
}

impl PhotoAsset {
    /// Extract download fields from a studio photo object. Missing or
    /// non-string fields are left empty rather than rejected.
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let id = match value.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            id,
            url: text("url"),
            filename: text("filename"),
            public_id: text("public_id"),
        }
    }

    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

impl From<&Photo> for PhotoAsset {
    fn from(photo: &Photo) -> Self {
        Self {
            id: Some(photo.id.to_string()),
            url: photo.url.clone(),
            filename: photo.filename.clone(),
            public_id: photo.public_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_tolerates_missing_and_numeric_fields() {
        let asset = PhotoAsset::from_json(&json!({ "id": 42, "url": "https://x/a.jpg", "filename": null }));
        assert_eq!(asset.id.as_deref(), Some("42"));
        assert_eq!(asset.url.as_deref(), Some("https://x/a.jpg"));
        assert!(asset.filename.is_none());
        assert!(asset.public_id.is_none());
        assert!(asset.has_url());
    }

    #[test]
    fn blank_url_is_not_downloadable() {
        let asset = PhotoAsset { url: Some("   ".to_string()), ..Default::default() };
        assert!(!asset.has_url());
        assert!(!PhotoAsset::default().has_url());
    }
}
