use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::state::{HomeFeed, MessagesBoard, ProfilePanel};
use crate::storage::SharedStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub home: HomeFeed,
    pub messages: MessagesBoard,
    pub profile: ProfilePanel,
    pub store: SharedStore,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/headlines", get(routes::get_headlines))
        .route("/search", get(routes::search))
        .route(
            "/messages",
            get(routes::get_messages)
                .post(routes::send_message)
                .delete(routes::clear_messages),
        )
        .route("/messages/reply", post(routes::simulate_reply))
        .route("/profile", get(routes::get_profile))
        .route("/profile/name", put(routes::update_name))
        .route("/profile/image", put(routes::update_image))
        .route("/profile/location", put(routes::update_location))
        .route("/stats", get(routes::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
