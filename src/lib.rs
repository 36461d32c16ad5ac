pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod media;
pub mod server;
pub mod services;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use server::app;
pub use state::AppState;
