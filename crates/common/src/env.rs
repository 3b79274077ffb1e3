//! Environment/runtime helpers
//!
//! Sanity checks run once at startup before the store is opened.

use std::path::Path;

use tracing::{info, warn};

/// Make sure the directory holding the data file exists.
///
/// A missing data file is not an error: the store writes an empty collection
/// on first access.
pub async fn ensure_env(data_file: &Path) -> anyhow::Result<()> {
    if data_file.as_os_str().is_empty() {
        return Err(anyhow::anyhow!("data file path is empty"));
    }
    if let Some(parent) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    match tokio::fs::metadata(data_file).await {
        Ok(meta) if meta.is_dir() => {
            return Err(anyhow::anyhow!("{} is a directory", data_file.display()));
        }
        Ok(_) => info!(data_file = %data_file.display(), "using existing data file"),
        Err(_) => warn!(data_file = %data_file.display(), "data file not found; it will be created on first request"),
    }
    Ok(())
}
