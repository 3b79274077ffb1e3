//! Lightweight admin HTTP server spawner
//!
//! Exposes `/healthz` and `/metrics` endpoints, with metrics provided by caller.
//! Runs on its own listener so the public port keeps its catch-all routing.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::types::Health;

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the admin router; `metrics_fn` renders the metrics exposition.
pub fn admin_router(metrics_fn: fn() -> (StatusCode, String)) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || async move { metrics_fn() }))
}

/// Bind `addr` and serve the admin router on a background task.
/// Returns the bound address. Bind failures are returned to the caller;
/// serve failures are logged.
pub async fn spawn_admin_server(
    addr: &str,
    metrics_fn: fn() -> (StatusCode, String),
) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("cannot bind admin listener {addr}: {e}"))?;
    let local = listener.local_addr()?;
    info!(addr = %local, "admin server listening");
    let router = admin_router(metrics_fn);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "admin server stopped");
        }
    });
    Ok((local, handle))
}
