use axum::{
    extract::{Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::message::MessageKind;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Deserialize)]
pub struct SendParams {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub image_uri: Option<String>,
    pub audio_uri: Option<String>,
}

#[derive(Deserialize)]
pub struct NameParams {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ImageParams {
    pub image_uri: String,
}

#[derive(Deserialize)]
pub struct LocationParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult = Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: error.into() }))
}

/// Serialize a state snapshot, or report the error it carries
fn respond<T: Serialize>(snapshot: &T, error: Option<&str>, status: StatusCode) -> ApiResult {
    if let Some(error) = error {
        return Err(api_error(status, error));
    }
    serde_json::to_value(snapshot)
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn get_headlines(State(state): State<Arc<AppState>>) -> ApiResult {
    let home = state.home.load_top_headlines().await;
    respond(&home, home.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult {
    state.home.set_query(&params.q);
    let home = state.home.search(&params.q).await;
    respond(&home, home.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn get_messages(State(state): State<Arc<AppState>>) -> ApiResult {
    let board = state.messages.reload().await;
    respond(&board, board.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(params): Json<SendParams>,
) -> ApiResult {
    let board = state
        .messages
        .send(
            &params.content,
            params.kind,
            params.image_uri.as_deref(),
            params.audio_uri.as_deref(),
        )
        .await;
    respond(&board, board.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn simulate_reply(State(state): State<Arc<AppState>>) -> ApiResult {
    let board = state.messages.simulate_reply().await;
    respond(&board, board.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn clear_messages(State(state): State<Arc<AppState>>) -> ApiResult {
    let board = state.messages.clear().await;
    respond(&board, board.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn get_profile(State(state): State<Arc<AppState>>) -> ApiResult {
    let panel = state.profile.load().await;
    respond(&panel, panel.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn update_name(
    State(state): State<Arc<AppState>>,
    Json(params): Json<NameParams>,
) -> ApiResult {
    if params.name.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "name must not be blank"));
    }
    let panel = state.profile.update_name(params.name.trim()).await;
    respond(&panel, panel.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn update_image(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ImageParams>,
) -> ApiResult {
    let panel = state.profile.update_image(&params.image_uri).await;
    respond(&panel, panel.error.as_deref(), StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(params): Json<LocationParams>,
) -> ApiResult {
    let fix = params.latitude.zip(params.longitude);
    let status = if fix.is_none() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let panel = state.profile.update_location(fix).await;
    respond(&panel, panel.error.as_deref(), status)
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    let stats = state
        .store
        .lock()
        .await
        .stats()
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    respond(&stats, None, StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Article;
    use crate::chat::ChatService;
    use crate::geo::{Place, ReverseGeocoder};
    use crate::profile::ProfileService;
    use crate::remote::{NewsSource, RemoteError};
    use crate::state::{HomeFeed, MessagesBoard, ProfilePanel};
    use crate::storage::{self, SqliteStore};
    use crate::sync::NewsRepository;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl NewsSource for Offline {
        async fn top_headlines(&self) -> Result<Vec<Article>, RemoteError> {
            Err(RemoteError::Status { status: 503, body: String::new() })
        }

        async fn search(&self, _query: &str) -> Result<Vec<Article>, RemoteError> {
            Err(RemoteError::Status { status: 503, body: String::new() })
        }
    }

    struct NoPlace;

    #[async_trait]
    impl ReverseGeocoder for NoPlace {
        async fn reverse(&self, _latitude: f64, _longitude: f64) -> crate::Result<Option<Place>> {
            Ok(None)
        }
    }

    async fn app() -> axum::Router {
        let store = storage::shared(SqliteStore::open_in_memory().unwrap());
        store
            .lock()
            .await
            .upsert_articles(&[Article::new("u1", "Test Title", "Test Source", "2023-01-01")])
            .unwrap();

        let state = Arc::new(AppState {
            home: HomeFeed::new(NewsRepository::new(Arc::new(Offline), store.clone())),
            messages: MessagesBoard::new(ChatService::new(store.clone())),
            profile: ProfilePanel::new(ProfileService::new(store.clone()), Arc::new(NoPlace)),
            store,
        });
        crate::server::router(state)
    }

    async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_headlines_fall_back_to_cache() {
        let (status, body) = call(
            app().await,
            Request::builder().uri("/headlines").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["articles"][0]["title"], "Test Title");
        assert_eq!(body["error"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_send_message() {
        let (status, body) = call(
            app().await,
            json_request("POST", "/messages", serde_json::json!({"content": "hello"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["messages"][0]["kind"], "text");
    }

    #[tokio::test]
    async fn test_location_without_fix_is_rejected() {
        let (status, body) = call(
            app().await,
            json_request("PUT", "/profile/location", serde_json::json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], crate::state::NO_LOCATION_ERROR);
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, body) = call(
            app().await,
            Request::builder().uri("/stats").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["articles"], 1);
        assert_eq!(body["has_profile"], false);
    }
}
