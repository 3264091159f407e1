//! # Prometheus Remote Storage Adapter CLI
//!
//! Serves `/write` and `/read` for Prometheus remote storage, backed by an
//! in-memory collection named after the configured bucket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use prom_remote_adapter::config::AdapterConfig;
use prom_remote_adapter::http::{build_router, AppState};
use prom_remote_adapter::metrics::AdapterMetrics;
use prom_remote_adapter::storage::MemoryStorage;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let mut config = if let Some(path) = &cli.config {
        AdapterConfig::load_from_path(path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
    } else {
        AdapterConfig::default()
    };
    if let Some(listen) = cli.listen {
        config.http.listen = listen;
    }

    info!(
        conn = %config.storage.conn_string,
        bucket = %config.storage.bucket,
        "using in-memory storage backend"
    );
    let storage = Arc::new(MemoryStorage::new(config.storage.bucket.clone()));

    let state = AppState::builder()
        .with_storage(storage)
        .with_metrics(Arc::new(AdapterMetrics::new()))
        .build()?;

    let app = build_router(state);

    let addr: SocketAddr = config.http.listen.parse().map_err(io::Error::other)?;
    info!("server running on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Resolves on the first Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("stopping server"),
        Err(e) => {
            warn!("failed to listen for interrupt signal: {e}");
            // Without a handler, keep serving until the process is killed.
            std::future::pending::<()>().await;
        }
    }
}
