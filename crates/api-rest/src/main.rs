//! Standalone search backend binary.
//!
//! ## Purpose
//! Runs the REST search backend on its own, without the workspace runner.
//!
//! ## Intended use
//! Useful during development of the backend alone. The workspace's main `wikinav-run` binary
//! starts the same server with ctrl-c handling.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{rest_addr_from_env_value, AppState, ENV_REST_ADDR};
use wikinav_core::CoreConfig;

/// Main entry point for the search backend.
///
/// # Environment Variables
/// - `WIKINAV_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `WIKINAV_WIKI_API_URL`: Encyclopedia API endpoint
/// - `WIKINAV_SEARCH_LIMIT`: Results requested upstream per search
/// - `WIKINAV_HTTP_TIMEOUT_SECS`: Upstream request timeout
///
/// # Errors
/// Returns an error if the configuration is invalid, the address cannot be bound, or the server
/// fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = rest_addr_from_env_value(std::env::var(ENV_REST_ADDR).ok())?;
    let cfg = CoreConfig::from_lookup(|name| std::env::var(name).ok())?;

    tracing::info!(
        "-- Starting WikiNav search backend on {} (upstream {})",
        addr,
        cfg.wiki_api_url()
    );

    api_rest::serve(addr, AppState::from_config(&cfg)?, std::future::pending()).await
}
