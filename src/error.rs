//! Error types for the chore tracker.
//!
//! Refusals caused by a locked chore are not errors: the mutating methods
//! return `Ok(false)` for those. Only lookups that cannot be answered and
//! storage failures travel through these types.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing an external chore/worker store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Errors surfaced by the repositories and chore handles.
#[derive(Error, Debug)]
pub enum ChoreError {
    /// Lookup by id matched zero records, or more than one.
    #[error("no unique {entity} with id '{id}' ({matches} matches)")]
    NotFound {
        entity: &'static str,
        id: String,
        matches: usize,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),

    /// The authoritative store could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl ChoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>, matches: usize) -> Self {
        ChoreError::NotFound {
            entity,
            id: id.into(),
            matches,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write configuration to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type Result<T, E = ChoreError> = std::result::Result<T, E>;
