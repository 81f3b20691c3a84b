use std::sync::Arc;

use codegraph_analytics::ConfigStore;
use codegraph_core::{Result, ServerConfig};
use codegraph_graph::SnapshotStore;

/// Shared handle every handler extracts. Deliberately thin: `SnapshotStore`
/// is read-only and cheap to open, so handlers open their own per request
/// rather than share one behind a lock, matching the "no caching, last
/// writer wins" concurrency model the config sidecar also follows.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub config_store: Arc<ConfigStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let config_store = ConfigStore::new(config.data_dir.clone());
        Self {
            config: Arc::new(config),
            config_store: Arc::new(config_store),
        }
    }

    /// Opens a fresh snapshot handle for `repo_id`, preferring the derived
    /// (`.enriched.db`) file when present. Raises `SnapshotNotFound` if
    /// neither file exists.
    pub fn open_snapshot(&self, repo_id: &str) -> Result<SnapshotStore> {
        SnapshotStore::open(&self.config.data_dir, repo_id)
    }
}
