// handlers/public/photos/mod.rs - Single-asset helpers

pub mod download; // GET /photos/download - proxy one photo as an attachment

pub use download::photo_download;
