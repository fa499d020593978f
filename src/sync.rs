//! News synchronizer
//!
//! Every request makes one attempt against the remote source. A successful
//! result is written through to the store and returned. A failed attempt is
//! swallowed and the cached articles matching the same criteria are returned
//! instead, with nothing telling the caller they came from cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use crate::Result;
use crate::article::{Article, Criteria};
use crate::remote::NewsSource;
use crate::storage::SharedStore;

/// Fetch-with-fallback over a remote source and the local article cache
#[derive(Clone)]
pub struct NewsRepository {
    source: Arc<dyn NewsSource>,
    store: SharedStore,
}

impl NewsRepository {
    pub fn new(source: Arc<dyn NewsSource>, store: SharedStore) -> Self {
        Self { source, store }
    }

    /// Fetch articles for the criteria, falling back to the cache on remote failure
    ///
    /// Only store failures are returned as errors.
    pub async fn fetch(&self, criteria: &Criteria) -> Result<Vec<Article>> {
        match self.source.fetch(criteria).await {
            Ok(articles) => {
                let articles = latest_per_url(articles);
                self.store.lock().await.upsert_articles(&articles)?;
                tracing::info!("Fetched {} articles for {}", articles.len(), criteria);
                Ok(articles)
            }
            Err(e) => {
                tracing::warn!("Fetch for {} failed, serving cache: {}", criteria, e);
                self.cached_for(criteria).await
            }
        }
    }

    pub async fn top_headlines(&self) -> Result<Vec<Article>> {
        self.fetch(&Criteria::TopHeadlines).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
        self.fetch(&Criteria::Search(query.to_string())).await
    }

    /// Everything in the cache, newest first
    pub async fn cached(&self) -> Result<Vec<Article>> {
        self.store.lock().await.all_articles()
    }

    /// Cached articles whose title or description contains `query`
    pub async fn search_cached(&self, query: &str) -> Result<Vec<Article>> {
        self.store.lock().await.search_articles(query)
    }

    async fn cached_for(&self, criteria: &Criteria) -> Result<Vec<Article>> {
        match criteria {
            Criteria::TopHeadlines => self.cached().await,
            Criteria::Search(query) => self.search_cached(query).await,
        }
    }

    /// Refresh headlines every `period` until the task is dropped
    ///
    /// The first refresh runs immediately. A tick that fails on the store is
    /// logged and the next tick tries again.
    pub async fn run_periodic(&self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match self.top_headlines().await {
                Ok(articles) => tracing::debug!("Background sync holds {} articles", articles.len()),
                Err(e) => tracing::error!("Background sync failed: {}", e),
            }
        }
    }

    /// Spawn `run_periodic` on the current runtime
    pub fn spawn_periodic(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let repo = self.clone();
        tokio::spawn(async move { repo.run_periodic(period).await })
    }
}

/// Collapse repeated urls to their last copy, keeping first-seen order
///
/// This is the set a replace-on-conflict upsert of `articles` leaves behind.
fn latest_per_url(articles: Vec<Article>) -> Vec<Article> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(articles.len());
    let mut unique: Vec<Article> = Vec::with_capacity(articles.len());
    for article in articles {
        match slots.get(&article.url) {
            Some(&slot) => unique[slot] = article,
            None => {
                slots.insert(article.url.clone(), unique.len());
                unique.push(article);
            }
        }
    }
    unique
}
