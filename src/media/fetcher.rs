use std::collections::HashSet;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, redirect, Client, Response, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::AssetConfig;

/// Versioned CDN delivery path, e.g. `/upload/v1712345678/`
static VERSION_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/upload/v\d+/").unwrap());

/// Used when no config is supplied
pub const DEFAULT_MAX_ASSET_BYTES: u64 = 256 * 1024 * 1024;

/// Most of a discarded body read before the connection is given up
const DRAIN_LIMIT: usize = 64 * 1024;

/// Why an asset could not be streamed. Every variant means "not found" to
/// callers; the reason only feeds logs and tests.
#[derive(Debug, Error)]
pub enum FetchMiss {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("gave up after {attempts} attempts")]
    TooManyAttempts { attempts: u32 },

    #[error("host not allowed: {0}")]
    HostNotAllowed(String),

    #[error("redirect cycle back to {0}")]
    RedirectCycle(String),

    #[error("redirect status {0} without a location")]
    MissingLocation(StatusCode),

    #[error("upstream returned {0}")]
    Status(StatusCode),

    #[error("transport error: {0}")]
    Transport(String),
}

/// A successful asset response whose body has not been read yet
#[derive(Debug)]
pub struct FetchedAsset {
    /// Final URL after redirects and version stripping
    pub url: Url,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    response: Response,
}

impl FetchedAsset {
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> {
        self.response.bytes_stream()
    }
}

/// HTTP GET against asset hosts with manual, bounded redirect handling and
/// the CDN stale-version retry.
#[derive(Clone)]
pub struct RemoteFetcher {
    client: Client,
    max_attempts: u32,
    max_asset_bytes: u64,
}

impl RemoteFetcher {
    pub fn new(config: &AssetConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(concat!("gallery-delivery/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, config.max_fetch_attempts).with_max_asset_bytes(config.max_asset_bytes))
    }

    /// The client must not follow redirects on its own
    pub fn with_client(client: Client, max_attempts: u32) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            max_asset_bytes: DEFAULT_MAX_ASSET_BYTES,
        }
    }

    pub fn with_max_asset_bytes(mut self, limit: u64) -> Self {
        self.max_asset_bytes = limit.max(1);
        self
    }

    /// Size ceiling archive callers enforce while staging a body
    pub fn max_asset_bytes(&self) -> u64 {
        self.max_asset_bytes
    }

    /// Fetch `url` as a byte stream. Never panics or propagates transport
    /// errors; every failure is logged and returned as a [`FetchMiss`].
    pub async fn fetch_stream(&self, url: &str) -> Result<FetchedAsset, FetchMiss> {
        self.fetch_stream_where(url, |_| true).await
    }

    /// Same as [`fetch_stream`](Self::fetch_stream), but every URL requested,
    /// including redirect targets and unversioned retries, must pass `allow`.
    /// A rejected hop is a [`FetchMiss::HostNotAllowed`] and is never requested.
    pub async fn fetch_stream_where<F>(&self, url: &str, allow: F) -> Result<FetchedAsset, FetchMiss>
    where
        F: Fn(&Url) -> bool + Sync,
    {
        let result = self.fetch_inner(url, &allow).await;
        if let Err(miss) = &result {
            tracing::warn!(url = %url, reason = %miss, "asset fetch failed");
        }
        result
    }

    async fn fetch_inner(&self, raw: &str, allow: &(dyn Fn(&Url) -> bool + Sync)) -> Result<FetchedAsset, FetchMiss> {
        let mut current = parse_asset_url(raw)?;
        let mut visited = HashSet::new();
        let mut attempt: u32 = 1;

        loop {
            if attempt > self.max_attempts {
                return Err(FetchMiss::TooManyAttempts {
                    attempts: attempt - 1,
                });
            }
            if !visited.insert(current.to_string()) {
                return Err(FetchMiss::RedirectCycle(current.to_string()));
            }
            if !allow(&current) {
                return Err(FetchMiss::HostNotAllowed(current.to_string()));
            }

            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| FetchMiss::Transport(e.to_string()))?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                drain(response).await;

                let location = location.ok_or(FetchMiss::MissingLocation(status))?;
                let next = current
                    .join(&location)
                    .map_err(|_| FetchMiss::InvalidUrl(location.clone()))?;
                tracing::debug!(from = %current, to = %next, attempt, "following asset redirect");
                current = next;
                attempt += 1;
                continue;
            }

            if status == StatusCode::OK {
                let content_type = response
                    .headers()
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let content_length = response.content_length();
                return Ok(FetchedAsset {
                    url: current,
                    content_type,
                    content_length,
                    response,
                });
            }

            if status == StatusCode::NOT_FOUND {
                if let Some(unversioned) = strip_version_segment(&current) {
                    drain(response).await;
                    tracing::debug!(from = %current, to = %unversioned, attempt, "retrying without CDN version");
                    current = unversioned;
                    attempt += 1;
                    continue;
                }
            }

            drain(response).await;
            return Err(FetchMiss::Status(status));
        }
    }
}

fn parse_asset_url(raw: &str) -> Result<Url, FetchMiss> {
    let url = Url::parse(raw.trim()).map_err(|_| FetchMiss::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(FetchMiss::InvalidUrl(raw.to_string())),
    }
}

/// `/upload/v123/x.jpg` -> `/upload/x.jpg`, or None when unversioned
pub fn strip_version_segment(url: &Url) -> Option<Url> {
    let raw = url.as_str();
    if !VERSION_SEGMENT.is_match(raw) {
        return None;
    }
    Url::parse(&VERSION_SEGMENT.replace(raw, "/upload/")).ok()
}

/// Read and discard a small body so the connection can go back to the pool.
/// Anything past `DRAIN_LIMIT` is abandoned along with the connection.
async fn drain(response: Response) {
    let mut stream = Box::pin(response.bytes_stream());
    let mut read = 0;
    while let Some(Ok(chunk)) = stream.next().await {
        read += chunk.len();
        if read >= DRAIN_LIMIT {
            break;
        }
    }
}
