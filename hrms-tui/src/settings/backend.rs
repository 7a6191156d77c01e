//! Storage seam for settings.

use async_trait::async_trait;

use super::SettingsError;

/// Raw byte storage keyed by dotted names (`api.base_url`).
///
/// Serialization is the provider's job; backends only move bytes.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError>;

    /// Insert or overwrite.
    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError>;
}
