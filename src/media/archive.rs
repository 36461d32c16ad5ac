use std::collections::HashSet;
use std::io::{self, Seek, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::database::models::PhotoAsset;
use crate::media::fetcher::RemoteFetcher;
use crate::media::filename::resolve_filename;

/// Receiving half becomes the HTTP response body
pub type ArchiveSink = mpsc::Sender<Result<Bytes, io::Error>>;

/// Largest slice pushed to the sink at once
const CHUNK_SIZE: usize = 64 * 1024;

/// Upper bound on what a `Content-Length` header may pre-allocate
const STAGING_RESERVE: u64 = (CHUNK_SIZE * 16) as u64;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("client disconnected")]
    Disconnected,

    #[error("zip writer error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What ended up in the archive
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArchiveSummary {
    pub entries: Vec<String>,
    pub skipped_without_url: usize,
    pub failed: usize,
    pub disconnected: bool,
    pub finalized: bool,
}

/// In-memory `Write` target shared between the zip writer and the task that
/// forwards finished bytes to the sink.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn take(&self) -> Vec<u8> {
        let mut inner = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *inner)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.0.lock().unwrap_or_else(|e| e.into_inner());
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hands out archive entry names, never the same one twice
#[derive(Default)]
struct EntryNames(HashSet<String>);

impl EntryNames {
    fn claim(&mut self, resolved: &str, fallback: &str) -> String {
        let base = base_name(resolved).unwrap_or_else(|| fallback.to_string());
        if self.0.insert(base.clone()) {
            return base;
        }

        let (stem, ext) = match base.rfind('.') {
            Some(i) if i > 0 => (&base[..i], &base[i..]),
            _ => (base.as_str(), ""),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{} ({}){}", stem, n, ext);
            if self.0.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Strip directory components so entries cannot escape the extraction root
fn base_name(name: &str) -> Option<String> {
    let normalized = name.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(str::to_string)
}

/// Stream a ZIP of `photos` into `sink`, one entry at a time in list order.
///
/// Photos without a URL are skipped. A photo whose fetch or body stream fails
/// is logged and left out; the rest of the archive still goes out. The sink is
/// dropped (ending the body) exactly once when this returns. If the client has
/// gone away the loop stops without fetching further photos.
pub async fn stream_archive(
    fetcher: &RemoteFetcher,
    gallery_name: &str,
    photos: &[PhotoAsset],
    sink: ArchiveSink,
) -> ArchiveSummary {
    let buffer = SharedBuffer::default();
    let mut zip = ZipWriter::new_stream(buffer.clone());
    let mut summary = ArchiveSummary::default();

    match append_photos(fetcher, &mut zip, &buffer, photos, &sink, &mut summary).await {
        Ok(()) => {}
        Err(ArchiveError::Disconnected) => {
            summary.disconnected = true;
            tracing::info!(gallery = %gallery_name, entries = summary.entries.len(), "client disconnected during archive download");
            return summary;
        }
        Err(e) => {
            tracing::error!(gallery = %gallery_name, error = %e, "archive writer failed");
            // Surface as a broken transfer rather than a well-formed but short zip
            let _ = sink.send(Err(io::Error::other(e.to_string()))).await;
            return summary;
        }
    }

    match zip.finish() {
        Ok(_) => summary.finalized = true,
        Err(e) => tracing::error!(gallery = %gallery_name, error = %e, "failed to finalize archive"),
    }
    if let Err(ArchiveError::Disconnected) = push(&buffer, &sink).await {
        summary.disconnected = true;
    }

    tracing::info!(
        gallery = %gallery_name,
        entries = summary.entries.len(),
        failed = summary.failed,
        skipped = summary.skipped_without_url,
        "archive download complete"
    );
    summary
}

async fn append_photos<W: Write + Seek>(
    fetcher: &RemoteFetcher,
    zip: &mut ZipWriter<W>,
    buffer: &SharedBuffer,
    photos: &[PhotoAsset],
    sink: &ArchiveSink,
    summary: &mut ArchiveSummary,
) -> Result<(), ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o644);
    let mut names = EntryNames::default();

    for photo in photos {
        if sink.is_closed() {
            return Err(ArchiveError::Disconnected);
        }

        let Some(url) = photo.url.as_deref().filter(|_| photo.has_url()) else {
            summary.skipped_without_url += 1;
            continue;
        };

        let resolved = resolve_filename(
            photo.filename.as_deref(),
            Some(url),
            photo.public_id.as_deref(),
            photo.id.as_deref(),
        );

        let asset = match fetcher.fetch_stream(url).await {
            Ok(asset) => asset,
            Err(_) => {
                summary.failed += 1;
                continue;
            }
        };

        let limit = fetcher.max_asset_bytes();
        if let Some(len) = asset.content_length.filter(|len| *len > limit) {
            tracing::warn!(url = %url, bytes = len, limit, "asset too large, skipping entry");
            summary.failed += 1;
            continue;
        }

        // Stage the whole body first so a stream that dies halfway leaves no
        // truncated entry behind. Only one photo, capped at `limit`, is held
        // at a time.
        let reserve = asset.content_length.unwrap_or(0).min(STAGING_RESERVE) as usize;
        let mut staged = BytesMut::with_capacity(reserve);
        let mut stream = Box::pin(asset.into_stream());
        let mut broken = None;
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) if (staged.len() + bytes.len()) as u64 > limit => {
                    broken = Some(format!("body exceeds {} bytes", limit));
                    break;
                }
                Ok(bytes) => staged.extend_from_slice(&bytes),
                Err(e) => {
                    broken = Some(e.to_string());
                    break;
                }
            }
        }
        drop(stream);

        if let Some(reason) = broken {
            tracing::warn!(url = %url, reason = %reason, "asset stream failed, skipping entry");
            summary.failed += 1;
            continue;
        }

        let name = names.claim(&resolved, &format!("photo_{}.jpg", summary.entries.len() + 1));
        zip.start_file(name.as_str(), options)?;
        for slice in staged.chunks(CHUNK_SIZE) {
            zip.write_all(slice)?;
            push(buffer, sink).await?;
        }
        tracing::debug!(entry = %name, bytes = staged.len(), "added archive entry");
        summary.entries.push(name);
    }

    Ok(())
}

/// Forward whatever the zip writer has produced so far
async fn push(buffer: &SharedBuffer, sink: &ArchiveSink) -> Result<(), ArchiveError> {
    let pending = buffer.take();
    if pending.is_empty() {
        return Ok(());
    }
    sink.send(Ok(Bytes::from(pending)))
        .await
        .map_err(|_| ArchiveError::Disconnected)
}
