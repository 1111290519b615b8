//! HTTP API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/` | Banner text |
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/api/snippets` | List snippets, newest first |
//! | `POST`   | `/api/snippets` | Create and annotate a snippet |
//! | `GET`    | `/api/snippets/{id}` | Fetch one snippet |
//! | `PATCH`  | `/api/snippets/{id}` | Overwrite the given fields |
//! | `DELETE` | `/api/snippets/{id}` | Remove a snippet |
//! | `GET`    | `/api/snippets/{id}/similar` | Ranked similar snippets; `?searchOnline=true` adds web results |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "snippet not found: 42" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser client can
//! be served from another origin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use snipai_core::{NewSnippet, ScoredCandidate, Snippet, SnippetError, SnippetPatch};

use crate::config::Config;
use crate::service::SnippetService;

/// Plain-text response for `GET /`.
pub const BANNER: &str = "SnipAI API is running...";

/// Starts the HTTP server using the configured store and search backend.
///
/// Runs until the process is terminated. Returns an error if the search
/// backend cannot be built or the bind address is unavailable.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(SnippetService::from_config(config)?);
    tracing::info!(provider = %config.search.provider, "web search backend ready");
    run_server_with_service(&config.server.bind, service).await
}

/// Starts the HTTP server around an already-built service.
///
/// Lets callers inject their own store or search implementations.
///
/// # Example
///
/// ```rust,no_run
/// use rand::{rngs::StdRng, SeedableRng};
/// use snipai::server::run_server_with_service;
/// use snipai::service::{ServiceOptions, SnippetService};
/// use snipai::web_search::DisabledSearch;
/// use snipai_core::store::memory::InMemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let service = SnippetService::new(
///     Arc::new(InMemoryStore::new()),
///     Arc::new(DisabledSearch),
///     StdRng::seed_from_u64(1),
///     ServiceOptions::default(),
/// );
/// run_server_with_service("127.0.0.1:5000", Arc::new(service)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_server_with_service(
    bind_addr: &str,
    service: Arc<SnippetService>,
) -> anyhow::Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("SnipAI server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// The application routes with CORS applied.
pub fn router(service: Arc<SnippetService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_banner))
        .route("/health", get(handle_health))
        .route(
            "/api/snippets",
            get(handle_list_snippets).post(handle_create_snippet),
        )
        .route(
            "/api/snippets/{id}",
            get(handle_get_snippet)
                .patch(handle_update_snippet)
                .delete(handle_delete_snippet),
        )
        .route("/api/snippets/{id}/similar", get(handle_similar_snippets))
        .layer(cors)
        .with_state(service)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<SnippetError> for AppError {
    fn from(err: SnippetError) -> Self {
        match &err {
            SnippetError::NotFound(_) => not_found(err.to_string()),
            SnippetError::Validation(_) => bad_request(err.to_string()),
            SnippetError::Collaborator(e) => {
                tracing::error!(error = %e, "request failed");
                internal(err.to_string())
            }
        }
    }
}

// ============ GET / and /health ============

async fn handle_banner() -> &'static str {
    BANNER
}

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /api/snippets ============

async fn handle_list_snippets(
    State(service): State<Arc<SnippetService>>,
) -> Result<Json<Vec<Snippet>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn handle_get_snippet(
    State(service): State<Arc<SnippetService>>,
    Path(id): Path<String>,
) -> Result<Json<Snippet>, AppError> {
    Ok(Json(service.get(&id).await?))
}

/// Query string for `GET /api/snippets/{id}/similar`.
#[derive(Debug, Deserialize)]
struct SimilarParams {
    #[serde(rename = "searchOnline")]
    search_online: Option<String>,
}

impl SimilarParams {
    /// Only the literal `true` enables web search.
    fn online(&self) -> bool {
        self.search_online.as_deref() == Some("true")
    }
}

async fn handle_similar_snippets(
    State(service): State<Arc<SnippetService>>,
    Path(id): Path<String>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<Vec<ScoredCandidate>>, AppError> {
    tracing::debug!(snippet = %id, online = params.online(), "similar snippets requested");
    Ok(Json(service.similar(&id, params.online()).await?))
}

async fn handle_create_snippet(
    State(service): State<Arc<SnippetService>>,
    Json(input): Json<NewSnippet>,
) -> Result<(StatusCode, Json<Snippet>), AppError> {
    let snippet = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(snippet)))
}

async fn handle_update_snippet(
    State(service): State<Arc<SnippetService>>,
    Path(id): Path<String>,
    Json(patch): Json<SnippetPatch>,
) -> Result<Json<Snippet>, AppError> {
    Ok(Json(service.update(&id, &patch).await?))
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn handle_delete_snippet(
    State(service): State<Arc<SnippetService>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    service.delete(&id).await?;
    Ok(Json(MessageResponse {
        message: "Snippet deleted successfully".to_string(),
    }))
}
