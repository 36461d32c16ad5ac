// handlers/mod.rs
//
// Only the public tier exists here: gallery reads and downloads are served
// to anonymous visitors holding a gallery link.
pub mod public;

pub use public::*;
