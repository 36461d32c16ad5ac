pub mod gallery_service;
pub mod studio_client;

pub use gallery_service::{GalleryError, GalleryService, GallerySource, ResolvedGallery};
pub use studio_client::{StudioClient, StudioLookup};
