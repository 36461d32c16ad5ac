pub mod gallery;
pub mod photo;

pub use gallery::{Gallery, GalleryRow};
pub use photo::{Photo, PhotoAsset};
