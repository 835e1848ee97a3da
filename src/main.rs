//! Fireworks Proxy - Main entry point
//!
//! Loads configuration from the environment once, then serves the proxy
//! routes until shutdown.

use anyhow::Result;
use fireworks_proxy::{
    api::{create_http_client, PROXY_PATHS},
    build_router,
    core::{config::API_KEY_ENV, init_metrics, init_tracing},
    AppConfig, AppState,
};
use std::sync::Arc;

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!(
            "{} is not set; proxy requests will fail with 500 until it is configured",
            API_KEY_ENV
        );
    }

    let http_client = create_http_client(&config)?;
    let host = config.server.host.clone();
    let port = config.server.port;

    tracing::info!(
        upstream = %config.upstream.url,
        timeout_secs = config.upstream.timeout_secs,
        "Upstream configured"
    );

    let state = Arc::new(AppState::new(config, http_client));
    let app = build_router(state);

    tracing::info!("Starting Fireworks proxy on {}:{}", host, port);
    tracing::info!("Proxy routes: {}", PROXY_PATHS.join(", "));
    tracing::info!("Health: /health, Metrics: /metrics");

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C (and SIGTERM on unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
