use std::path::Path;
use tracing_subscriber::EnvFilter;

use ride_cancel_predictor::{
    app::{self, AppState},
    config::{AppConfig, CONFIG_FILE},
    ModelHandle,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = AppConfig::load_or_default(Path::new(CONFIG_FILE))?;

    // Loaded once; a missing artifact leaves the handle unavailable for good
    let model = ModelHandle::load(&cfg.model);

    let app = app::router(AppState::new(model, cfg.threshold));

    tracing::info!("listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
