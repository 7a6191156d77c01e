//! Persistent key-value settings.
//!
//! Values are stored as bincode blobs behind a [`SettingsBackend`]; the
//! [`SettingsProvider`] adds typed access on top.

mod backend;
mod sqlite;

pub use backend::SettingsBackend;
pub use sqlite::SqliteBackend;

use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Keys the application reads and writes.
pub mod keys {
    /// `String`: API root, e.g. `http://localhost:8000/api/`.
    pub const API_BASE_URL: &str = "api.base_url";
    /// `u64`: request timeout in seconds.
    pub const API_TIMEOUT_SECS: &str = "api.timeout_secs";
    /// `Option<u64>`: employee the attendance table was last filtered by.
    pub const FILTER_EMPLOYEE: &str = "attendance.filter_employee";
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
    #[error("cannot create settings directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Typed settings access. Clones share the backend.
#[derive(Clone)]
pub struct SettingsProvider {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsProvider {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Open (creating if needed) the SQLite settings database at `path`.
    pub async fn open(path: &Path) -> Result<Self, SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(SqliteBackend::new(path).await?))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        match self.backend.get_bytes(key).await? {
            Some(bytes) => Ok(Some(
                bincode::deserialize(&bytes).map_err(SettingsError::Deserialization)?,
            )),
            None => Ok(None),
        }
    }

    pub async fn get_or<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, SettingsError> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), SettingsError> {
        let bytes = bincode::serialize(value).map_err(SettingsError::Serialization)?;
        self.backend.set_bytes(key, bytes).await
    }
}
