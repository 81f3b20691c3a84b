use std::path::{Path, PathBuf};

use codegraph_core::{CodeGraphError, LoadBearingConfig, Result};

/// Per-repo load-bearing sidecar, read fresh on every request and written
/// only on explicit declare/undeclare mutations — no caching, last-writer
/// wins on the filesystem.
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into() }
    }

    fn path(&self, repo_id: &str) -> PathBuf {
        self.config_dir.join(format!("{repo_id}.load-bearing.json"))
    }

    /// Missing file reads as an empty config, matching the sidecar's
    /// absent-file default.
    pub fn read(&self, repo_id: &str) -> Result<LoadBearingConfig> {
        let path = self.path(repo_id);
        if !path.exists() {
            return Ok(LoadBearingConfig::default());
        }
        let text = std::fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(CodeGraphError::Serialization)
    }

    fn write(&self, repo_id: &str, config: &LoadBearingConfig) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let text = serde_json::to_string_pretty(config).map_err(CodeGraphError::Serialization)?;
        std::fs::write(self.path(repo_id), text)?;
        Ok(())
    }

    /// Toggles one hash or one module substring in/out of the declared
    /// sets and persists the result. Exactly one of `hash`/`module` should
    /// be `Some`.
    pub fn declare(
        &self,
        repo_id: &str,
        hash: Option<&str>,
        module: Option<&str>,
        remove: bool,
    ) -> Result<LoadBearingConfig> {
        let mut config = self.read(repo_id)?;
        if let Some(hash) = hash {
            if remove {
                config.declared_nodes.retain(|h| h != hash);
            } else if !config.declared_nodes.iter().any(|h| h == hash) {
                config.declared_nodes.push(hash.to_string());
            }
        }
        if let Some(module) = module {
            if remove {
                config.declared_modules.retain(|m| m != module);
            } else if !config.declared_modules.iter().any(|m| m == module) {
                config.declared_modules.push(module.to_string());
            }
        }
        self.write(repo_id, &config)?;
        Ok(config)
    }
}

pub fn default_config_dir() -> PathBuf {
    Path::new("./data/config").to_path_buf()
}
