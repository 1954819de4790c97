use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ThumbError;
use crate::images::ImageModel;
use crate::studio::{ScoredVideo, Studio, ThumbnailOutcome, ThumbnailRequest, ThumbnailSource};
use crate::video_id::extract_video_id;

/// Start the REST API server
pub async fn start_server(config: Config, host: String, port: u16) -> anyhow::Result<()> {
    let studio = Studio::from_config(&config)?;
    let state = ApiState {
        config: Arc::new(config),
        studio: Arc::new(studio),
    };

    let app = create_router(state);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("REST API server starting on http://{}", addr);
    eprintln!("\x1b[32m✓\x1b[0m Server listening on \x1b[1mhttp://{}\x1b[0m", addr);
    eprintln!("\x1b[36m  • Health check:\x1b[0m http://{}/health", addr);
    eprintln!("\x1b[36m  • Search:\x1b[0m       POST http://{}/search", addr);
    eprintln!("\x1b[36m  • Thumbnails:\x1b[0m   POST http://{}/thumbnails\n", addr);
    eprintln!("\x1b[33m💡 Press Ctrl+C to stop the server\x1b[0m\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state accessible to all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub studio: Arc<Studio>,
}

/// Response for API errors
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
}

impl From<ThumbError> for ErrorResponse {
    fn from(err: ThumbError) -> Self {
        let status = match &err {
            ThumbError::NotFound(_) | ThumbError::NoImages { .. } => StatusCode::NOT_FOUND,
            ThumbError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ThumbError::MissingApiKey(_) => StatusCode::SERVICE_UNAVAILABLE,
            ThumbError::Provider { .. } | ThumbError::Http(_) | ThumbError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        if status.is_server_error() {
            warn!("Request failed: {}", err);
        }
        ErrorResponse {
            status,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoIdQuery {
    pub url: String,
}

/// Request body for thumbnail generation; `url` wins over `title`.
#[derive(Debug, Deserialize)]
pub struct ThumbnailsRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub model: Option<ImageModel>,
    pub count: Option<u32>,
    #[serde(default = "default_true")]
    pub use_llm: bool,
}

fn default_true() -> bool {
    true
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/config", get(get_config))
        .route("/video-id", get(video_id))
        .route("/search", post(search))
        .route("/analyze", post(analyze))
        .route("/thumbnails", post(thumbnails))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Current configuration, without API keys
async fn get_config(State(state): State<ApiState>) -> Json<Config> {
    Json(state.config.redacted())
}

async fn video_id(Query(query): Query<VideoIdQuery>) -> Result<Json<serde_json::Value>, ErrorResponse> {
    let id = extract_video_id(&query.url)
        .ok_or_else(|| ThumbError::not_found(format!("no video id in {:?}", query.url)))?;
    let watch_url = id.watch_url();
    Ok(Json(serde_json::json!({
        "video_id": id,
        "watch_url": watch_url
    })))
}

async fn search(
    State(state): State<ApiState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<ScoredVideo>>, ErrorResponse> {
    let results = state
        .studio
        .search(&request.query, request.max_results)
        .await?;
    Ok(Json(results))
}

async fn analyze(
    State(state): State<ApiState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ScoredVideo>, ErrorResponse> {
    let scored = state.studio.analyze(&request.url).await?;
    Ok(Json(scored))
}

async fn thumbnails(
    State(state): State<ApiState>,
    Json(request): Json<ThumbnailsRequest>,
) -> Result<Json<ThumbnailOutcome>, ErrorResponse> {
    let source = match (request.url, request.title) {
        (Some(url), _) if !url.trim().is_empty() => ThumbnailSource::Video(url),
        (_, Some(title)) => ThumbnailSource::Title(title),
        _ => {
            return Err(ThumbError::invalid_input("either url or title is required").into());
        }
    };

    let outcome = state
        .studio
        .generate_thumbnails(&ThumbnailRequest {
            source,
            model: request.model,
            count: request.count,
            use_llm: request.use_llm,
        })
        .await?;
    Ok(Json(outcome))
}
