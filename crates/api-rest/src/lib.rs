//! # API REST
//!
//! The search backend the WikiNav client talks to.
//!
//! Handles:
//! - `GET /search?q=` proxied to the encyclopedia's full-text search and reshaped into
//!   `{ results: [{ pageid, title, snippet }] }`
//! - `GET /health`
//! - OpenAPI/Swagger documentation and permissive CORS (browser front ends call it cross-origin)
//!
//! Uses `api-shared` for the wire types and `wikinav-core` for the upstream client.

#![warn(rust_2018_idioms)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, HealthRes, HealthService, SearchHit, SearchReq, SearchRes};
use wikinav_core::{build_client, CoreConfig, EncyclopediaApi, NonEmptyText, WikipediaApi};

/// Environment variable holding the bind address.
pub const ENV_REST_ADDR: &str = "WIKINAV_REST_ADDR";

/// Bind address used when `WIKINAV_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    encyclopedia: Arc<dyn EncyclopediaApi>,
    search_limit: u32,
}

impl AppState {
    pub fn new(encyclopedia: Arc<dyn EncyclopediaApi>, search_limit: u32) -> Self {
        Self {
            encyclopedia,
            search_limit,
        }
    }

    /// State backed by the live encyclopedia API described by `cfg`.
    pub fn from_config(cfg: &CoreConfig) -> anyhow::Result<Self> {
        let client = build_client(cfg)?;
        Ok(Self::new(
            Arc::new(WikipediaApi::from_config(cfg, client)),
            cfg.search_limit(),
        ))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, search),
    components(schemas(HealthRes, SearchRes, SearchHit, ErrorRes))
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the bind address from an optional environment value.
pub fn rest_addr_from_env_value(value: Option<String>) -> anyhow::Result<SocketAddr> {
    let raw = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REST_ADDR.into());
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{ENV_REST_ADDR}: {e} ({raw})"))
}

/// Serve the router on `addr` until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- WikiNav search backend listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/search",
    params(SearchReq),
    responses(
        (status = 200, description = "Search results, possibly empty", body = SearchRes),
        (status = 400, description = "Missing or blank query", body = ErrorRes),
        (status = 502, description = "Encyclopedia search failed", body = ErrorRes)
    )
)]
/// Full-text search over the encyclopedia.
///
/// Makes exactly one upstream call per request and returns at most the configured number of
/// hits. Snippets are passed through as HTML.
#[axum::debug_handler]
async fn search(
    State(state): State<AppState>,
    Query(req): Query<SearchReq>,
) -> Result<Json<SearchRes>, (StatusCode, Json<ErrorRes>)> {
    let query = NonEmptyText::new(&req.q).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorRes::new("query parameter `q` is required")),
        )
    })?;

    match state.encyclopedia.search(&query, state.search_limit).await {
        Ok(results) => {
            tracing::debug!(%query, count = results.len(), "search served");
            Ok(Json(results.into_iter().collect()))
        }
        Err(e) => {
            tracing::error!("Search error for {:?}: {}", query.as_str(), e);
            Err((StatusCode::BAD_GATEWAY, Json(ErrorRes::new(e.user_message()))))
        }
    }
}
