#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use gallery_delivery::config::{AssetConfig, SecurityConfig, StudioConfig};
use gallery_delivery::database::models::{Gallery, Photo};
use gallery_delivery::database::{DatabaseError, GalleryStore};
use gallery_delivery::media::RemoteFetcher;
use gallery_delivery::services::{GalleryService, StudioClient};
use gallery_delivery::types::GalleryStatus;
use gallery_delivery::{app, AppState};

pub struct TestServer {
    pub base_url: String,
}

/// Legacy-database stand-in that counts photo queries.
/// Slug lookups only need to find or miss here.
#[derive(Default)]
pub struct MemoryStore {
    galleries: Mutex<Vec<(Gallery, Vec<Photo>)>>,
    photo_queries: AtomicUsize,
}

impl MemoryStore {
    pub fn insert(&self, gallery: Gallery, photos: Vec<Photo>) {
        self.galleries.lock().unwrap().push((gallery, photos));
    }

    pub fn photo_queries(&self) -> usize {
        self.photo_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GalleryStore for MemoryStore {
    async fn find_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, DatabaseError> {
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
        event_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1),
        subheading: Some("Highlights".to_string()),
        status: GalleryStatus::Active,
        header_media_url: None,
        header_media_type: None,
    }
}

pub fn photo(gallery: &Gallery, url: Option<String>, filename: Option<&str>, minute: u32) -> Photo {
    Photo {
        id: Uuid::new_v4(),
        client_id: gallery.id,
        url,
        filename: filename.map(str::to_string),
        public_id: None,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap(),
    }
}

pub fn studio(base_url: Option<String>) -> Result<StudioClient> {
    match base_url {
        Some(url) => Ok(StudioClient::new(&StudioConfig {
            api_url: Some(url),
            sync_secret: Some("test-secret".to_string()),
            timeout_secs: 5,
        })?),
        None => Ok(StudioClient::disabled()),
    }
}

/// Serve the full router in-process on a free port
pub async fn spawn_server(
    studio: StudioClient,
    store: Arc<MemoryStore>,
    allowed_hosts: Vec<String>,
) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let fetcher = RemoteFetcher::new(&AssetConfig {
        max_fetch_attempts: 3,
        fetch_timeout_secs: 10,
        connect_timeout_secs: 2,
        max_asset_bytes: 16 * 1024 * 1024,
        allowed_hosts: allowed_hosts.clone(),
    })?;
    let state = AppState::new(GalleryService::new(studio, store), fetcher, allowed_hosts);
    let router = app(state, &SecurityConfig { cors_origins: Vec::new() });

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    wait_ready(&base_url, Duration::from_secs(5)).await?;
    Ok(TestServer { base_url })
}

async fn wait_ready(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if let Ok(resp) = client.get(format!("{}/health", base_url)).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", base_url, timeout)
}

/// Entry names and contents of a ZIP body, in archive order
pub fn zip_entries(body: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(body.to_vec()))?;
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push((file.name().to_string(), data));
    }
    Ok(entries)
}
