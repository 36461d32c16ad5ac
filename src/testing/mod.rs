use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::database::models::{Gallery, Photo};
use crate::database::{DatabaseError, GalleryStore};
use crate::types::GalleryStatus;

/// In-memory gallery store that counts the queries it serves
#[derive(Default)]
pub struct MemoryGalleryStore {
    galleries: Mutex<Vec<(Gallery, Vec<Photo>)>>,
    gallery_lookups: AtomicUsize,
    photo_queries: AtomicUsize,
}

impl MemoryGalleryStore {
    pub fn with_gallery(self, gallery: Gallery, photos: Vec<Photo>) -> Self {
        self.galleries.lock().unwrap().push((gallery, photos));
        self
    }

    pub fn gallery_lookups(&self) -> usize {
        self.gallery_lookups.load(Ordering::SeqCst)
    }

    pub fn photo_queries(&self) -> usize {
        self.photo_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GalleryStore for MemoryGalleryStore {
    async fn find_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, DatabaseError> {
        self.gallery_lookups.fetch_add(1, Ordering::SeqCst);
        let galleries = self.galleries.lock().unwrap();
        Ok(galleries.iter().find(|(g, _)| g.slug == slug).map(|(g, _)| g.clone()))
    }

    async fn list_photos(&self, gallery_id: Uuid) -> Result<Vec<Photo>, DatabaseError> {
        self.photo_queries.fetch_add(1, Ordering::SeqCst);
        let galleries = self.galleries.lock().unwrap();
        let mut photos = galleries
            .iter()
            .find(|(g, _)| g.id == gallery_id)
            .map(|(_, p)| p.clone())
            .unwrap_or_default();
        photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(photos)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub fn gallery(name: &str, slug: &str) -> Gallery {
    Gallery {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        event_date: None,
        subheading: None,
        status: GalleryStatus::Active,
        header_media_url: None,
        header_media_type: None,
    }
}

/// Photo created `minute` minutes after a fixed epoch
pub fn photo(gallery: &Gallery, url: &str, minute: i64) -> Photo {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    Photo {
        id: Uuid::new_v4(),
        client_id: gallery.id,
        url: Some(url.to_string()),
        filename: None,
        public_id: None,
        created_at: base + Duration::minutes(minute),
    }
}
