//! # Pulse - offline-first news, chat and profile
//!
//! Pulse provides:
//! - A news synchronizer that prefers fresh remote data and falls back to the
//!   last articles it cached
//! - A chat simulator backed by a local message log
//! - A single-user profile record with place resolution for coordinates
//! - Observable state holders for a thin UI client
//! - SQLite-backed storage for all of the above

pub mod article;
pub mod message;
pub mod profile;
pub mod storage;
pub mod remote;
pub mod sync;
pub mod chat;
pub mod geo;
pub mod state;
pub mod server;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use article::{Article, Criteria};
pub use message::{ChatMessage, MessageKind};
pub use profile::{ProfileService, UserProfile};
pub use storage::{SharedStore, SqliteStore};
pub use sync::NewsRepository;
pub use chat::ChatService;

/// Result type alias for Pulse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Pulse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Remote error: {0}")]
    Remote(#[from] remote::RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
