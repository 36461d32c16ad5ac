use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::StudioConfig;

/// Header carrying the shared secret expected by the studio's internal API
pub const SYNC_SECRET_HEADER: &str = "x-admin-sync-secret";

/// Outcome of asking the studio service for a gallery.
/// `Miss` and `Error` both send the caller to the legacy store.
#[derive(Debug, Clone, PartialEq)]
pub enum StudioLookup {
    Hit(Value),
    Miss,
    Error(String),
}

/// Client for the studio service's legacy-gallery endpoint
#[derive(Clone)]
pub struct StudioClient {
    base_url: Option<String>,
    sync_secret: Option<String>,
    client: Client,
}

impl StudioClient {
    pub fn new(config: &StudioConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.api_url.clone(),
            sync_secret: config.sync_secret.clone(),
            client,
        })
    }

    /// Client that never calls out; every lookup is a miss
    pub fn disabled() -> Self {
        Self {
            base_url: None,
            sync_secret: None,
            client: Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    /// GET `<base>/api/internal/legacy/gallery/<slug>`
    pub async fn lookup_gallery(&self, slug: &str) -> StudioLookup {
        let Some(base) = self.base_url.as_deref() else {
            return StudioLookup::Miss;
        };

        let url = match gallery_url(base, slug) {
            Some(url) => url,
            None => return StudioLookup::Error(format!("invalid studio base url: {}", base)),
        };

        let mut request = self.client.get(url);
        if let Some(secret) = self.sync_secret.as_deref() {
            request = request.header(SYNC_SECRET_HEADER, secret);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return StudioLookup::Error(format!("request failed: {}", e)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return StudioLookup::Miss;
        }
        if !status.is_success() {
            return StudioLookup::Error(format!("studio returned {}", status));
        }

        match response.json::<Value>().await {
            Ok(Value::Null) => StudioLookup::Miss,
            Ok(body @ Value::Object(_)) => StudioLookup::Hit(body),
            Ok(other) => StudioLookup::Error(format!("unexpected payload type: {}", type_name(&other))),
            Err(e) => StudioLookup::Error(format!("invalid payload: {}", e)),
        }
    }
}

fn gallery_url(base: &str, slug: &str) -> Option<Url> {
    let mut url = Url::parse(base).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["api", "internal", "legacy", "gallery", slug]);
    Some(url)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
