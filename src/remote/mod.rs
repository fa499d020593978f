//! Remote Source - network access to the news provider
//!
//! The synchronizer only sees the `NewsSource` trait; `NewsApiClient` is the
//! production implementation.

pub mod newsapi;

pub use newsapi::NewsApiClient;

use async_trait::async_trait;
use crate::article::{Article, Criteria};

/// Failures talking to a remote service
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A provider of article lists
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Current top headlines
    async fn top_headlines(&self) -> Result<Vec<Article>, RemoteError>;

    /// Articles matching a keyword
    async fn search(&self, query: &str) -> Result<Vec<Article>, RemoteError>;

    /// Dispatch on the fetch criteria
    async fn fetch(&self, criteria: &Criteria) -> Result<Vec<Article>, RemoteError> {
        match criteria {
            Criteria::TopHeadlines => self.top_headlines().await,
            Criteria::Search(query) => self.search(query).await,
        }
    }
}
