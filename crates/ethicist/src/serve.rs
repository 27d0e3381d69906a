//! Streamable HTTP server: MCP at `/mcp`, liveness at `/health`.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::{routing::get, Json, Router};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::service::Ethicist;

#[derive(Clone)]
pub struct HealthState {
    pub start_time: Instant,
}

pub async fn handle_health(State(state): State<HealthState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The full application router.
pub fn router(service: Arc<Ethicist>) -> Router {
    let health_router = Router::new()
        .route("/health", get(handle_health))
        .with_state(HealthState {
            start_time: Instant::now(),
        });

    Router::new()
        .nest("/mcp", baton::streamable_router(service))
        .merge(health_router)
}

pub async fn run(service: Arc<Ethicist>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("MCP (Streamable): POST http://{}/mcp", addr);
    info!("Health: GET http://{}/health", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable, relying on ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
