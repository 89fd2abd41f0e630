use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};

use instrumented_http::api::create_router;
use instrumented_http::app::{
    AppState, ServerConfig, ShutdownOutcome, serve_with_shutdown, shutdown_signal,
};
use instrumented_http::infra::{ServerMetrics, build_registry, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    // Registration failures are configuration errors; refuse to start.
    let metrics = Arc::new(ServerMetrics::new().context("failed to create metrics")?);
    let registry = build_registry(&metrics).context("failed to register metrics")?;

    let app_state = Arc::new(AppState::new(metrics, registry, config.clone()));
    let router = create_router(app_state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        addr = %config.bind_addr,
        metrics_path = %config.metrics_path,
        "Starting server"
    );

    match serve_with_shutdown(listener, router, config.shutdown_timeout, shutdown_signal()).await? {
        ShutdownOutcome::Graceful => info!("Server stopped"),
        ShutdownOutcome::TimedOut => warn!("Server stopped with requests still in flight"),
    }

    Ok(())
}
