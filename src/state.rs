use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, GalleryStore, PgGalleryStore};
use crate::media::RemoteFetcher;
use crate::services::{GalleryService, StudioClient};

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub galleries: GalleryService,
    pub fetcher: RemoteFetcher,
    pub allowed_asset_hosts: Arc<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppState {
    pub fn new(galleries: GalleryService, fetcher: RemoteFetcher, allowed_asset_hosts: Vec<String>) -> Self {
        Self {
            galleries,
            fetcher,
            allowed_asset_hosts: Arc::new(allowed_asset_hosts),
        }
    }

    /// Wire up the Postgres store, studio client and asset fetcher from config
    pub fn from_config(config: &AppConfig) -> Result<Self, StateError> {
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        let store: Arc<dyn GalleryStore> = Arc::new(PgGalleryStore::new(pool));

        let studio = if config.studio.api_url.is_some() {
            StudioClient::new(&config.studio)?
        } else {
            tracing::info!("STUDIO_API_URL not set, serving galleries from the local database only");
            StudioClient::disabled()
        };

        Ok(Self::new(
            GalleryService::new(studio, store),
            RemoteFetcher::new(&config.assets)?,
            config.assets.allowed_hosts.clone(),
        ))
    }
}
