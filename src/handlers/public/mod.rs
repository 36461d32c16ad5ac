// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None (anyone with a gallery slug)
// Route Prefix: No /api prefix (e.g., /gallery/*, /photos/*)

pub mod gallery;
pub mod photos;

pub use gallery::{gallery_download, gallery_get};
pub use photos::photo_download;
