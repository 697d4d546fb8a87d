//! Tracker configuration loaded from TOML.

use crate::error::{ConfigError, Result};
use crate::persistence::JsonFileStore;
use crate::repository::{ChoreRepository, WorkerRepository};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the chore and worker collections live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One `<name>.json` file per collection inside `data_dir`.
    #[default]
    Json,
    /// One table per collection in `data_dir/chores.db`.
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub backend: StoreBackend,
    pub chore_store_name: String,
    pub worker_store_name: String,
    /// Field the chore collection is sorted by right after loading.
    pub default_sort_field: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            backend: StoreBackend::Json,
            chore_store_name: "chores".to_string(),
            worker_store_name: "workers".to_string(),
            default_sort_field: "date".to_string(),
        }
    }
}

impl TrackerConfig {
    pub const DATABASE_FILE: &'static str = "chores.db";

    pub fn from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> std::result::Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_error)?;
        Ok(())
    }

    /// `~/.config/chore-tracker/config.toml`, honouring `XDG_CONFIG_HOME`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("chore-tracker").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("chore-tracker")
                .join("config.toml")
        } else {
            PathBuf::from("chore-tracker.toml")
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(Self::DATABASE_FILE)
    }

    /// Loads both repositories from the configured backend.
    pub fn open_repositories(&self) -> Result<(ChoreRepository, WorkerRepository)> {
        debug!(backend = ?self.backend, data_dir = %self.data_dir.display(), "opening stores");
        match self.backend {
            StoreBackend::Json => {
                let chores = JsonFileStore::in_dir(&self.data_dir, &self.chore_store_name);
                let workers = JsonFileStore::in_dir(&self.data_dir, &self.worker_store_name);
                Ok((
                    ChoreRepository::load_sorted_by(chores, &self.default_sort_field)?,
                    WorkerRepository::load(workers)?,
                ))
            }
            StoreBackend::Sqlite => self.open_sqlite(),
        }
    }

    #[cfg(feature = "sqlite")]
    fn open_sqlite(&self) -> Result<(ChoreRepository, WorkerRepository)> {
        use crate::persistence::SqliteStore;

        std::fs::create_dir_all(&self.data_dir).map_err(crate::error::StoreError::from)?;
        let path = self.database_path();
        let chores = SqliteStore::open(&path, &self.chore_store_name)?;
        let workers = SqliteStore::open(&path, &self.worker_store_name)?;
        Ok((
            ChoreRepository::load_sorted_by(chores, &self.default_sort_field)?,
            WorkerRepository::load(workers)?,
        ))
    }

    #[cfg(not(feature = "sqlite"))]
    fn open_sqlite(&self) -> Result<(ChoreRepository, WorkerRepository)> {
        Err(crate::error::ChoreError::InvalidOperation(
            "sqlite backend requires the `sqlite` feature".to_string(),
        ))
    }
}
