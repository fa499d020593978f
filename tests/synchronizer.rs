//! Fetch-with-fallback behaviour against a real on-disk store

use async_trait::async_trait;
use pulse::remote::{NewsSource, RemoteError};
use pulse::storage::{self, SqliteStore};
use pulse::{Article, Criteria, NewsRepository};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Serves a fixed list until switched offline
struct Switchable {
    articles: Vec<Article>,
    online: AtomicBool,
}

impl Switchable {
    fn new(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            online: AtomicBool::new(true),
        })
    }

    fn go_offline(&self) {
        self.online.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Status {
                status: 503,
                body: "offline".to_string(),
            })
        }
    }
}

#[async_trait]
impl NewsSource for Switchable {
    async fn top_headlines(&self) -> Result<Vec<Article>, RemoteError> {
        self.check()?;
        Ok(self.articles.clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<Article>, RemoteError> {
        self.check()?;
        Ok(self.articles.iter().filter(|a| a.matches(query)).cloned().collect())
    }
}

fn sample() -> Vec<Article> {
    vec![
        Article::new("https://example.com/1", "Test Title", "Test Source", "2023-01-01T00:00:00Z")
            .with_description("Test Description"),
        Article::new("https://example.com/2", "Markets rally", "Wire", "2023-01-02T00:00:00Z")
            .with_description("Stocks up 100%"),
    ]
}

#[tokio::test]
async fn headlines_survive_going_offline_and_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("pulse.db");

    let source = Switchable::new(sample());
    {
        let store = storage::shared(SqliteStore::open(&db).unwrap());
        let repo = NewsRepository::new(source.clone(), store);
        assert_eq!(repo.top_headlines().await.unwrap().len(), 2);
    }

    source.go_offline();
    let store = storage::shared(SqliteStore::open(&db).unwrap());
    let repo = NewsRepository::new(source, store);

    let cached = repo.top_headlines().await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].title, "Markets rally");
    assert_eq!(cached[1].title, "Test Title");
}

#[tokio::test]
async fn refetching_does_not_duplicate() {
    let store = storage::shared(SqliteStore::open_in_memory().unwrap());
    let repo = NewsRepository::new(Switchable::new(sample()), store.clone());

    repo.fetch(&Criteria::TopHeadlines).await.unwrap();
    repo.fetch(&Criteria::TopHeadlines).await.unwrap();

    assert_eq!(store.lock().await.count_articles().unwrap(), 2);
}

#[tokio::test]
async fn offline_search_matches_cached_text() {
    let store = storage::shared(SqliteStore::open_in_memory().unwrap());
    let source = Switchable::new(sample());
    let repo = NewsRepository::new(source.clone(), store);

    repo.top_headlines().await.unwrap();
    source.go_offline();

    let hits = repo.search("description").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://example.com/1");

    let literal = repo.search("100%").await.unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].title, "Markets rally");

    assert!(repo.search("nothing like this").await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_cache_while_offline_is_empty_not_error() {
    let store = storage::shared(SqliteStore::open_in_memory().unwrap());
    let source = Switchable::new(sample());
    source.go_offline();

    let repo = NewsRepository::new(source, store);
    assert!(repo.top_headlines().await.unwrap().is_empty());
}
