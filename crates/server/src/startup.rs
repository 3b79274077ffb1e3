use std::sync::Arc;

use common::admin_http::spawn_admin_server;
use common::env::ensure_env;
use configs::AppConfig;
use service::notes::{FileNoteRepository, NoteRepository};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::observability;
use crate::routes;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteRepository>,
}

impl AppState {
    pub fn new(notes: Arc<dyn NoteRepository>) -> Self {
        Self { notes }
    }
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: open the store, build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    ensure_env(&cfg.storage.data_file).await?;

    let notes = FileNoteRepository::new(cfg.storage.data_file.clone()).await?;
    info!(data_file = %notes.path().display(), "note store ready");

    if let Some(admin_addr) = cfg.admin.addr.as_deref() {
        let (bound, _admin_task) = spawn_admin_server(admin_addr, observability::encode_metrics).await?;
        info!(admin = %bound, "healthz and metrics available");
    }

    let app = routes::build_router(AppState::new(notes));

    let addr = cfg.server.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "notes server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("notes server stopped");
    Ok(())
}
