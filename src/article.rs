//! Article types
//!
//! An article is identified by its source URL. The store keeps at most one
//! row per URL and a re-fetch replaces every field of that row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cached news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Source URL, unique within the store
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Publication timestamp exactly as the provider sent it
    pub published_at: String,
    /// Display name of the publishing outlet
    pub source: String,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl Article {
    /// Create an article with the required fields only
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: None,
            image_url: None,
            published_at: published_at.into(),
            source: source.into(),
            content: None,
            author: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Whether `query` occurs in the title or description (ASCII case-insensitive)
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_ascii_lowercase();
        self.title.to_ascii_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_ascii_lowercase().contains(&needle))
    }
}

/// Fetch mode selector for the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "query", rename_all = "snake_case")]
pub enum Criteria {
    /// The provider's current top headlines
    TopHeadlines,
    /// Keyword search
    Search(String),
}

impl Criteria {
    /// Build criteria from a free-text query; a blank query means top headlines
    pub fn from_query(query: &str) -> Self {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            Criteria::TopHeadlines
        } else {
            Criteria::Search(trimmed.to_string())
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::TopHeadlines => write!(f, "top headlines"),
            Criteria::Search(q) => write!(f, "search '{}'", q),
        }
    }
}
