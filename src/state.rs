//! Presentation state holders
//!
//! Each holder owns the latest snapshot of one screen's state and publishes
//! it over a `tokio::sync::watch` channel. Actions update the snapshot before
//! and after the underlying service call; failures end up in `error` rather
//! than being returned.

use std::sync::Arc;
use serde::Serialize;
use tokio::sync::watch;
use crate::article::{Article, Criteria};
use crate::chat::ChatService;
use crate::geo::ReverseGeocoder;
use crate::message::{ChatMessage, MessageKind};
use crate::profile::{ProfileService, UserProfile};
use crate::sync::NewsRepository;

/// Shown when no coordinates could be obtained
pub const NO_LOCATION_ERROR: &str = "Unable to get current location. Please check your location settings.";

// ========== Home ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeState {
    pub articles: Vec<Article>,
    pub query: String,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

/// News feed screen state
pub struct HomeFeed {
    news: NewsRepository,
    tx: watch::Sender<HomeState>,
}

impl HomeFeed {
    pub fn new(news: NewsRepository) -> Self {
        let (tx, _rx) = watch::channel(HomeState::default());
        Self { news, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> HomeState {
        self.tx.borrow().clone()
    }

    pub async fn load_top_headlines(&self) -> HomeState {
        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let result = self.news.top_headlines().await;
        self.finish(result, |s| s.is_loading = false)
    }

    /// Search for `query`; a blank query reloads the headlines
    pub async fn search(&self, query: &str) -> HomeState {
        let Criteria::Search(query) = Criteria::from_query(query) else {
            return self.load_top_headlines().await;
        };

        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let result = self.news.search(&query).await;
        self.finish(result, |s| s.is_loading = false)
    }

    pub fn set_query(&self, query: &str) {
        self.tx.send_modify(|s| s.query = query.to_string());
    }

    pub async fn refresh(&self) -> HomeState {
        self.load_top_headlines().await
    }

    /// Reload headlines, flagging `is_refreshing` instead of `is_loading`
    pub async fn pull_to_refresh(&self) -> HomeState {
        self.tx.send_modify(|s| {
            s.is_refreshing = true;
            s.error = None;
        });
        let result = self.news.top_headlines().await;
        self.finish(result, |s| s.is_refreshing = false)
    }

    pub fn clear_error(&self) {
        self.tx.send_modify(|s| s.error = None);
    }

    fn finish(&self, result: crate::Result<Vec<Article>>, done: impl FnOnce(&mut HomeState)) -> HomeState {
        publish(&self.tx, |s| {
            done(s);
            match result {
                Ok(articles) => {
                    s.articles = articles;
                    s.error = None;
                }
                Err(e) => s.error = Some(e.to_string()),
            }
        })
    }
}

// ========== Messages ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagesState {
    pub messages: Vec<ChatMessage>,
    pub error: Option<String>,
}

/// Chat screen state
pub struct MessagesBoard {
    chat: ChatService,
    tx: watch::Sender<MessagesState>,
}

impl MessagesBoard {
    pub fn new(chat: ChatService) -> Self {
        let (tx, _rx) = watch::channel(MessagesState::default());
        Self { chat, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<MessagesState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> MessagesState {
        self.tx.borrow().clone()
    }

    /// Re-read the log and publish it
    pub async fn reload(&self) -> MessagesState {
        let result = self.chat.messages().await;
        publish(&self.tx, |s| match result {
            Ok(messages) => {
                s.messages = messages;
                s.error = None;
            }
            Err(e) => s.error = Some(e.to_string()),
        })
    }

    pub async fn send(
        &self,
        content: &str,
        kind: MessageKind,
        image_uri: Option<&str>,
        audio_uri: Option<&str>,
    ) -> MessagesState {
        match self.chat.send(content, kind, image_uri, audio_uri).await {
            Ok(_) => self.reload().await,
            Err(e) => self.fail(e),
        }
    }

    pub async fn simulate_reply(&self) -> MessagesState {
        match self.chat.simulate_reply().await {
            Ok(_) => self.reload().await,
            Err(e) => self.fail(e),
        }
    }

    pub async fn clear(&self) -> MessagesState {
        match self.chat.clear().await {
            Ok(()) => self.reload().await,
            Err(e) => self.fail(e),
        }
    }

    fn fail(&self, e: crate::Error) -> MessagesState {
        publish(&self.tx, |s| s.error = Some(e.to_string()))
    }
}

// ========== Profile ==========

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileState {
    pub profile: Option<UserProfile>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            is_loading: true,
            error: None,
        }
    }
}

/// Profile screen state
pub struct ProfilePanel {
    profiles: ProfileService,
    geocoder: Arc<dyn ReverseGeocoder>,
    tx: watch::Sender<ProfileState>,
}

impl ProfilePanel {
    pub fn new(profiles: ProfileService, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        let (tx, _rx) = watch::channel(ProfileState::default());
        Self { profiles, geocoder, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProfileState {
        self.tx.borrow().clone()
    }

    pub async fn load(&self) -> ProfileState {
        let result = self.profiles.profile().await;
        self.publish(result)
    }

    pub async fn update_name(&self, name: &str) -> ProfileState {
        self.begin();
        let result = self.profiles.update_name(name).await.map(Some);
        self.publish(result)
    }

    pub async fn update_image(&self, image_uri: &str) -> ProfileState {
        self.begin();
        let result = self.profiles.update_image(image_uri).await.map(Some);
        self.publish(result)
    }

    /// Store the current position; `None` means no fix was available
    pub async fn update_location(&self, fix: Option<(f64, f64)>) -> ProfileState {
        self.begin();
        let Some((latitude, longitude)) = fix else {
            return publish(&self.tx, |s| {
                s.is_loading = false;
                s.error = Some(NO_LOCATION_ERROR.to_string());
            });
        };

        let result = self
            .profiles
            .locate(latitude, longitude, self.geocoder.as_ref())
            .await
            .map(Some);
        self.publish(result)
    }

    pub fn clear_error(&self) {
        self.tx.send_modify(|s| s.error = None);
    }

    fn begin(&self) {
        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn publish(&self, result: crate::Result<Option<UserProfile>>) -> ProfileState {
        publish(&self.tx, |s| {
            s.is_loading = false;
            match result {
                Ok(profile) => s.profile = profile,
                Err(e) => s.error = Some(e.to_string()),
            }
        })
    }
}

/// Apply `change` and return the state exactly as it was published
fn publish<S: Clone + Default>(tx: &watch::Sender<S>, change: impl FnOnce(&mut S)) -> S {
    let mut published = S::default();
    tx.send_modify(|s| {
        change(s);
        published = s.clone();
    });
    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Place;
    use crate::remote::{NewsSource, RemoteError};
    use crate::storage::{self, SharedStore, SqliteStore};
    use async_trait::async_trait;

    struct FixedSource(Vec<Article>);

    #[async_trait]
    impl NewsSource for FixedSource {
        async fn top_headlines(&self) -> Result<Vec<Article>, RemoteError> {
            Ok(self.0.clone())
        }

        async fn search(&self, query: &str) -> Result<Vec<Article>, RemoteError> {
            Ok(self.0.iter().filter(|a| a.matches(query)).cloned().collect())
        }
    }

    struct NoPlace;

    #[async_trait]
    impl ReverseGeocoder for NoPlace {
        async fn reverse(&self, _latitude: f64, _longitude: f64) -> crate::Result<Option<Place>> {
            Ok(None)
        }
    }

    fn store() -> SharedStore {
        storage::shared(SqliteStore::open_in_memory().unwrap())
    }

    fn feed(store: SharedStore) -> HomeFeed {
        let articles = vec![
            Article::new("u1", "Test Title", "Test Source", "2023-01-01").with_description("Test Description"),
            Article::new("u2", "Other", "Test Source", "2023-01-02"),
        ];
        HomeFeed::new(NewsRepository::new(Arc::new(FixedSource(articles)), store))
    }

    #[tokio::test]
    async fn test_load_top_headlines_publishes_articles() {
        let home = feed(store());
        let mut rx = home.subscribe();

        let state = home.load_top_headlines().await;

        assert_eq!(state.articles.len(), 2);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), state);
    }

    #[tokio::test]
    async fn test_search_and_blank_search() {
        let home = feed(store());

        let state = home.search("test query").await;
        assert!(state.articles.is_empty());

        let state = home.search("Title").await;
        assert_eq!(state.articles.len(), 1);

        let state = home.search("  ").await;
        assert_eq!(state.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_set_query_and_pull_to_refresh() {
        let home = feed(store());
        home.set_query("test query");
        assert_eq!(home.snapshot().query, "test query");

        let state = home.pull_to_refresh().await;
        assert!(!state.is_refreshing);
        assert_eq!(state.articles.len(), 2);
        assert_eq!(state.query, "test query");

        let state = home.refresh().await;
        assert!(!state.is_loading);
        home.clear_error();
        assert!(home.snapshot().error.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_searches_get_their_own_results() {
        let articles: Vec<Article> = (0..8)
            .map(|i| Article::new(format!("u{}", i), format!("topic{} news", i), "Test Source", "2023-01-01"))
            .collect();
        let home = Arc::new(HomeFeed::new(NewsRepository::new(
            Arc::new(FixedSource(articles)),
            store(),
        )));

        let mut tasks = Vec::new();
        for i in (0..32).map(|n| n % 8) {
            let home = home.clone();
            tasks.push(tokio::spawn(async move {
                let query = format!("topic{}", i);
                let state = home.search(&query).await;
                (query, state)
            }));
        }

        for task in tasks {
            let (query, state) = task.await.unwrap();
            assert_eq!(state.articles.len(), 1, "results for {}", query);
            assert!(state.articles[0].matches(&query));
        }
    }

    #[tokio::test]
    async fn test_messages_board_tracks_log() {
        let board = MessagesBoard::new(ChatService::new(store()));

        let state = board.send("Test message", MessageKind::Text, None, None).await;
        assert_eq!(state.messages.len(), 1);

        let state = board.simulate_reply().await;
        assert_eq!(state.messages.len(), 2);
        assert!(!state.messages[1].from_user);

        let state = board.clear().await;
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn test_profile_panel_location() {
        let panel = ProfilePanel::new(ProfileService::new(store()), Arc::new(NoPlace));
        assert!(panel.snapshot().is_loading);

        let state = panel.load().await;
        assert!(!state.is_loading);
        assert!(state.profile.is_none());

        let state = panel.update_location(None).await;
        assert_eq!(state.error.as_deref(), Some(NO_LOCATION_ERROR));
        panel.clear_error();
        assert!(panel.snapshot().error.is_none());

        let state = panel.update_location(Some((10.0, 20.0))).await;
        let profile = state.profile.unwrap();
        assert_eq!(profile.location.as_deref(), Some("Lat: 10.0000, Lng: 20.0000"));
        assert_eq!(profile.name, crate::profile::DEFAULT_NAME);
    }
}
