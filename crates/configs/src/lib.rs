use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the whole note collection.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Optional side listener for `/healthz` and `/metrics`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub addr: Option<String>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_data_file() -> PathBuf { PathBuf::from("data.json") }

/// Load `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config {path}: {e}"))?;
    from_toml_str(&content)
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File (or defaults), then process environment, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply `SERVER_HOST`, `SERVER_PORT`, `NOTES_DATA_FILE`, `ADMIN_ADDR`
    /// and `LOG_FORMAT` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT is not a valid port: {port}"))?;
        }
        if let Some(file) = lookup("NOTES_DATA_FILE") {
            self.storage.data_file = PathBuf::from(file);
        }
        if let Some(addr) = lookup("ADMIN_ADDR") {
            self.admin.addr = Some(addr).filter(|a| !a.trim().is_empty());
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = match format.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                other => return Err(anyhow!("LOG_FORMAT must be compact or json, got {other}")),
            };
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_toml_uses_defaults() -> Result<()> {
        let mut cfg = from_toml_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.data_file, PathBuf::from("data.json"));
        assert_eq!(cfg.log.format, LogFormat::Compact);
        assert!(cfg.admin.addr.is_none());
        Ok(())
    }

    #[test]
    fn toml_sections_are_read() -> Result<()> {
        let cfg = from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 2

            [storage]
            data_file = "var/notes.json"

            [log]
            format = "json"

            [admin]
            addr = "127.0.0.1:9188"
            "#,
        )?;
        assert_eq!(cfg.server.bind_addr()?, "0.0.0.0:9000".parse::<SocketAddr>()?);
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.storage.data_file, PathBuf::from("var/notes.json"));
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.admin.addr.as_deref(), Some("127.0.0.1:9188"));
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let env: HashMap<&str, &str> = [
            ("SERVER_PORT", "8181"),
            ("NOTES_DATA_FILE", "/tmp/notes.json"),
            ("LOG_FORMAT", "JSON"),
            ("ADMIN_ADDR", ""),
        ]
        .into_iter()
        .collect();
        let mut cfg = from_toml_str("[admin]\naddr = \"127.0.0.1:9188\"\n")?;
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()))?;
        assert_eq!(cfg.server.port, 8181);
        assert_eq!(cfg.storage.data_file, PathBuf::from("/tmp/notes.json"));
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert!(cfg.admin.addr.is_none());
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_overrides(|k| (k == "SERVER_PORT").then(|| "http".to_string())).is_err());

        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.storage.data_file = PathBuf::new();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
