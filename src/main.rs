//! Urban Atlas — binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, and metrics.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use urban_atlas::api::{self, AppState};
use urban_atlas::config::AppConfig;
use urban_atlas::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("urban_atlas=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when variables come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env();
    let metrics = Metrics::init(cfg.source_timeout_secs)?;
    let state = AppState::from_config(&cfg)?;

    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "urban-atlas listening");
    axum::serve(listener, app).await?;
    Ok(())
}
