//! NewsAPI client
//!
//! Two endpoints, both plain GETs authenticated with an `apiKey` query
//! parameter:
//! - `{base}/top-headlines?country=..`
//! - `{base}/everything?q=..`
//!
//! Both answer with a `{status, totalResults, articles}` envelope, or
//! `{status: "error", code, message}` on failure.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{Level, event, instrument};
use super::{NewsSource, RemoteError};
use crate::article::Article;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_COUNTRY: &str = "us";

/// Response envelope shared by both endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEnvelope {
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<ArticleDto>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub source: SourceDto,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourceDto {
    pub id: Option<String>,
    pub name: String,
}

impl From<ArticleDto> for Article {
    fn from(dto: ArticleDto) -> Self {
        Article {
            url: dto.url,
            title: dto.title.unwrap_or_default(),
            description: dto.description,
            image_url: dto.url_to_image,
            published_at: dto.published_at,
            source: dto.source.name,
            content: dto.content,
            author: dto.author,
        }
    }
}

impl NewsEnvelope {
    /// Unwrap the article list, turning an error envelope into `RemoteError::Api`
    pub fn into_articles(self) -> Result<Vec<Article>, RemoteError> {
        if self.status != "ok" {
            return Err(RemoteError::Api {
                code: self.code.unwrap_or_else(|| self.status.clone()),
                message: self.message.unwrap_or_default(),
            });
        }
        Ok(self.articles.into_iter().map(Article::from).collect())
    }
}

/// HTTP client for newsapi.org (or a compatible endpoint)
#[derive(Clone)]
pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    country: String,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    #[instrument(level = "debug", skip(self, params))]
    async fn get_articles(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<Article>, RemoteError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        event!(Level::TRACE, response = text);

        if !status.is_success() {
            // Error envelopes carry a provider code worth surfacing in logs
            return Err(match serde_json::from_str::<NewsEnvelope>(&text) {
                Ok(envelope) if envelope.code.is_some() => RemoteError::Api {
                    code: envelope.code.unwrap_or_default(),
                    message: envelope.message.unwrap_or_default(),
                },
                _ => RemoteError::Status { status: status.as_u16(), body: text },
            });
        }

        let envelope: NewsEnvelope = serde_json::from_str(&text)?;
        tracing::debug!(total = envelope.total_results, received = envelope.articles.len(), "news envelope");
        envelope.into_articles()
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn top_headlines(&self) -> Result<Vec<Article>, RemoteError> {
        self.get_articles("top-headlines", &[("country", self.country.as_str())]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Article>, RemoteError> {
        self.get_articles("everything", &[("q", query)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use std::collections::HashMap;

    const ENVELOPE: &str = r#"{
        "status": "ok",
        "totalResults": 1,
        "articles": [{
            "source": {"id": "test", "name": "Test Source"},
            "author": "Test Author",
            "title": "Test Title",
            "description": "Test Description",
            "url": "test-url",
            "urlToImage": "test-image",
            "publishedAt": "2023-01-01",
            "content": "Test Content"
        }]
    }"#;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn envelope_json() -> serde_json::Value {
        serde_json::from_str(ENVELOPE).unwrap()
    }

    #[test]
    fn test_envelope_maps_articles() {
        let envelope: NewsEnvelope = serde_json::from_str(ENVELOPE).unwrap();
        let articles = envelope.into_articles().unwrap();

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.url, "test-url");
        assert_eq!(article.title, "Test Title");
        assert_eq!(article.source, "Test Source");
        assert_eq!(article.image_url.as_deref(), Some("test-image"));
        assert_eq!(article.published_at, "2023-01-01");
    }

    #[test]
    fn test_error_envelope() {
        let envelope: NewsEnvelope = serde_json::from_str(
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid"}"#,
        )
        .unwrap();

        match envelope.into_articles() {
            Err(RemoteError::Api { code, .. }) => assert_eq!(code, "apiKeyInvalid"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_top_headlines_sends_key_and_country() {
        let router = Router::new().route(
            "/top-headlines",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("apiKey").map(String::as_str) != Some("secret")
                    || params.get("country").map(String::as_str) != Some("gb")
                {
                    return Err(StatusCode::BAD_REQUEST);
                }
                Ok(Json(envelope_json()))
            }),
        );
        let base = serve(router).await;

        let client = NewsApiClient::new("secret").with_base_url(base).with_country("gb");
        let articles = client.top_headlines().await.unwrap();
        assert_eq!(articles[0].title, "Test Title");
    }

    #[tokio::test]
    async fn test_search_sends_query() {
        let router = Router::new().route(
            "/everything",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("q").map(String::as_str) != Some("rust lang") {
                    return Err(StatusCode::BAD_REQUEST);
                }
                Ok(Json(envelope_json()))
            }),
        );
        let base = serve(router).await;

        let articles = NewsApiClient::new("k").with_base_url(base).search("rust lang").await.unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_api_error() {
        let router = Router::new().route(
            "/top-headlines",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(serde_json::json!({"status": "error", "code": "apiKeyMissing", "message": "missing"})),
                )
            }),
        );
        let base = serve(router).await;

        let err = NewsApiClient::new("").with_base_url(base).top_headlines().await.unwrap_err();
        assert!(matches!(err, RemoteError::Api { ref code, .. } if code == "apiKeyMissing"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let router = Router::new().route(
            "/top-headlines",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = serve(router).await;

        let err = NewsApiClient::new("k").with_base_url(base).top_headlines().await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 502, .. }));
    }
}
