use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{rest_addr_from_env_value, AppState, ENV_REST_ADDR};
use wikinav_core::CoreConfig;

/// Main entry point for the WikiNav runner
///
/// Starts the search backend the `wikinav` client calls, using the workspace-wide
/// configuration, and shuts it down cleanly on ctrl-c.
///
/// # Environment Variables
/// - `WIKINAV_REST_ADDR`: search backend address (default: "0.0.0.0:8000")
/// - `WIKINAV_WIKI_API_URL`: encyclopedia API endpoint (default: English Wikipedia)
/// - `WIKINAV_SEARCH_LIMIT`: results requested upstream per search (default: 10)
/// - `WIKINAV_HTTP_TIMEOUT_SECS`: upstream request timeout (default: 10)
///
/// # Returns
/// * `Ok(())` - If the server starts and stops cleanly
/// * `Err(anyhow::Error)` - If configuration, startup, or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wikinav=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var(ENV_REST_ADDR).ok())?;
    let cfg = CoreConfig::from_lookup(|name| std::env::var(name).ok())?;

    tracing::info!("++ Starting WikiNav search backend on {}", rest_addr);
    tracing::info!("++ Upstream encyclopedia API {}", cfg.wiki_api_url());

    let state = AppState::from_config(&cfg)?;
    api_rest::serve(rest_addr, state, shutdown_signal()).await?;

    tracing::info!("++ WikiNav stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
