//! Application Configuration
//!
//! Resolution order:
//! 1. Explicit path passed by the caller
//! 2. `ANIME_TIER_CONFIG` environment variable
//! 3. `<config dir>/anime-tier/config.toml`
//! 4. Built-in defaults
//!
//! A missing file falls through to the next source; a malformed one is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

pub const CONFIG_ENV_VAR: &str = "ANIME_TIER_CONFIG";
const APP_DIR: &str = "anime-tier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub data_dir: PathBuf,
    /// Relative to `data_dir` unless absolute
    pub db_file: PathBuf,
    pub assets_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Daily log files kept
    pub log_retention: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            app_name: "AnimeTier".to_string(),
            db_file: PathBuf::from("anime_tier.db"),
            assets_dir: data_dir.join("assets"),
            log_dir: data_dir.join("logs"),
            log_retention: 7,
            data_dir,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./anime_tier_data"))
}

impl AppConfig {
    /// Load configuration following the resolution order above
    pub fn load(explicit: Option<&Path>) -> DomainResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        if let Some(path) = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml")) {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> DomainResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| match e {
                DomainError::InvalidInput(msg) => {
                    DomainError::InvalidInput(format!("{}: {}", path.display(), msg))
                }
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn from_toml(content: &str) -> DomainResult<Self> {
        toml::from_str(content).map_err(|e| DomainError::InvalidInput(e.to_string()))
    }

    /// Config rooted at one directory, used for tests and portable installs
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            data_dir: dir.to_path_buf(),
            assets_dir: dir.join("assets"),
            log_dir: dir.join("logs"),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        if self.db_file.is_absolute() {
            self.db_file.clone()
        } else {
            self.data_dir.join(&self.db_file)
        }
    }

    /// Create the data, asset and log directories
    pub fn ensure_dirs(&self) -> DomainResult<()> {
        for dir in [&self.data_dir, &self.assets_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                DomainError::Storage(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }
}
