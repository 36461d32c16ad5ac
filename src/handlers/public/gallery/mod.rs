// handlers/public/gallery/mod.rs - Shareable gallery endpoints

pub mod download; // GET /gallery/:slug/download - streamed ZIP of all photos
pub mod show; // GET /gallery/:slug - gallery metadata and photo list

pub use download::gallery_download;
pub use show::gallery_get;
