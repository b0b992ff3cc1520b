//! SlideCraft Persistence Server
//!
//! A small REST server that stores presentations in memory. It is the
//! remote side of the editor's persistence synchronizer.
//!
//! ## API
//!
//! ```text
//! POST /presentations          { "title": "..." }            -> 201 presentation
//! GET  /presentations/{id}                                   -> 200 presentation | 404
//! PUT  /presentations/{id}     { "title": ..., "slides": [] } -> 200 presentation
//! ```
//!
//! Saves replace the stored record wholesale; concurrent writers are
//! last-write-wins.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use dashmap::DashMap;
use serde::Deserialize;
use slidecraft_core::scene::{PresentationData, Slide};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

/// Shared application state
struct AppState {
    /// Stored presentations, keyed by id
    presentations: DashMap<String, PresentationData>,
}

impl AppState {
    fn new() -> Self {
        Self {
            presentations: DashMap::new(),
        }
    }
}

/// Body of `POST /presentations`
#[derive(Debug, Deserialize)]
struct CreateRequest {
    #[serde(default)]
    title: Option<String>,
}

/// Body of `PUT /presentations/{id}`
#[derive(Debug, Deserialize)]
struct SaveRequest {
    title: String,
    slides: Vec<Slide>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slidecraft_server=info,tower_http=info".into()),
        )
        .init();

    let app = router(Arc::new(AppState::new()));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3030));
    info!("SlideCraft server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("server error");
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/presentations", post(create_presentation))
        .route(
            "/presentations/{id}",
            get(fetch_presentation).put(save_presentation),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "SlideCraft Persistence Server"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Create a presentation with one empty slide
async fn create_presentation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRequest>,
) -> impl IntoResponse {
    let data = PresentationData {
        id: Uuid::new_v4().to_string(),
        title: req
            .title
            .unwrap_or_else(|| "Untitled Presentation".to_string()),
        slides: vec![Slide::first()],
    };
    state.presentations.insert(data.id.clone(), data.clone());
    info!("Created presentation {}", data.id);
    (StatusCode::CREATED, Json(data))
}

/// Fetch a presentation by id
async fn fetch_presentation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PresentationData>, StatusCode> {
    state
        .presentations
        .get(&id)
        .map(|entry| Json(entry.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Replace a presentation's title and slides wholesale
async fn save_presentation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SaveRequest>,
) -> Json<PresentationData> {
    let data = PresentationData {
        id: id.clone(),
        title: req.title,
        slides: req.slides,
    };
    // An unknown id is accepted and stored; the editor may be syncing a
    // presentation created while offline.
    state.presentations.insert(id, data.clone());
    Json(data)
}
