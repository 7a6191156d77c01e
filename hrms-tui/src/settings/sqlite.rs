//! SQLite settings storage with a read-through cache.

use std::path::Path;

use async_sqlite::{Client, ClientBuilder};
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;

use super::{SettingsBackend, SettingsError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
)";

pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, Vec<u8>>,
}

impl SqliteBackend {
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let client = ClientBuilder::new().path(path).open().await?;
        client.conn(|conn| conn.execute(CREATE_TABLE, [])).await?;
        debug!("settings database at {}", path.display());

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let owned = key.to_string();
        let value = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?")?;
                let mut rows = stmt.query([&owned])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, Vec<u8>>(0)?)),
                    None => Ok(None),
                }
            })
            .await?;

        if let Some(value) = &value {
            self.cache.insert(key.to_string(), value.clone());
        }
        Ok(value)
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
        let owned = key.to_string();
        let stored = value.clone();
        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO settings (key, value) VALUES (?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![&owned, &stored],
                )
            })
            .await?;

        self.cache.insert(key.to_string(), value);
        Ok(())
    }
}
