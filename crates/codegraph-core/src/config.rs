use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Bind address, data directory, and log filter for the analytics HTTP
/// surface and CLI. Deliberately small: the per-repo load-bearing
/// declarations are their own sidecar, not part of this struct, and are
/// re-read on every request rather than cached here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    /// Directory holding `{repo_id}.db` / `{repo_id}.enriched.db` snapshots
    /// and `{repo_id}.load-bearing.json` sidecars (see `ConfigStore`).
    #[serde(default = "ServerConfig::default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "ServerConfig::default_log_filter")]
    pub log_filter: String,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".into()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }

    fn default_log_filter() -> String {
        "info".into()
    }

    /// Loads configuration from `config/default.toml`, an optional
    /// `config/{CODEGRAPH_ENV}.toml` overlay, and `CODEGRAPH__*` environment
    /// variables, in that order, matching the teacher's layered-source
    /// convention.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let env_name = env::var("CODEGRAPH_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .set_default("host", Self::default_host())?
            .set_default("port", Self::default_port() as i64)?
            .set_default("data_dir", Self::default_data_dir().display().to_string())?
            .set_default("log_filter", Self::default_log_filter())?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env_name}")).required(false))
            .add_source(config::Environment::with_prefix("CODEGRAPH").separator("__"));

        let settings = builder.build().context("building configuration")?;
        let cfg: Self = settings
            .try_deserialize()
            .context("deserializing configuration")?;
        info!(host = %cfg.host, port = cfg.port, data_dir = %cfg.data_dir.display(), "configuration loaded");
        Ok(cfg)
    }

}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            data_dir: Self::default_data_dir(),
            log_filter: Self::default_log_filter(),
        }
    }
}
