use std::sync::Arc;

use anyhow::Context;
use common::{telemetry, Config, DatasetStore};
use npt_api::{create_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config comes first so its log level can seed the subscriber
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {:#}. Using defaults.", e);
        Config::default()
    });
    telemetry::init_tracing("npt-api", &config.log_level);

    let store = match DatasetStore::load_from_dir(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            error!("❌ Failed to load datasets: {}", e);
            warn!("Serving with an empty dataset store; /health reports datasets_loaded=false");
            DatasetStore::default()
        }
    };

    let state = Arc::new(AppState::new(store, &config));
    let app = create_router(state);

    info!("🚀 API listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
