//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - articles(url, title, description, image_url, published_at, source, content, author)
//! - messages(id, content, timestamp, from_user, kind, image_uri, audio_uri)
//! - user_profile(id, name, image_uri, location, latitude, longitude)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};

use std::sync::Arc;
use tokio::sync::Mutex;

/// A store shared between services and async tasks
pub type SharedStore = Arc<Mutex<SqliteStore>>;

/// Wrap a store for sharing
pub fn shared(store: SqliteStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}
