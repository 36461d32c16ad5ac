pub mod archive;
pub mod fetcher;
pub mod filename;

pub use archive::{stream_archive, ArchiveSink, ArchiveSummary};
pub use fetcher::{FetchMiss, FetchedAsset, RemoteFetcher};
pub use filename::{archive_filename, content_disposition, resolve_filename};
