//! Startup configuration.
//!
//! The API root comes from `HRMS_API_URL`, then the `api.base_url` setting,
//! then [`DEFAULT_BASE_URL`]. The request timeout comes from the
//! `api.timeout_secs` setting.

use std::time::Duration;

use hrms_lib::DEFAULT_BASE_URL;
use log::{info, warn};

use crate::settings::{SettingsProvider, keys};

/// Environment variable overriding the API root.
pub const API_URL_ENV: &str = "HRMS_API_URL";

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV: &str = "HRMS_LOG";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    /// Employee filter restored from the previous session.
    pub filter_employee: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            filter_employee: None,
        }
    }
}

impl Config {
    /// Resolve configuration from the environment and stored settings.
    ///
    /// Unreadable settings are logged and treated as absent.
    pub async fn load(settings: Option<&SettingsProvider>) -> Self {
        let env_url = std::env::var(API_URL_ENV).ok();

        let mut stored = StoredSettings::default();
        if let Some(settings) = settings {
            stored.base_url = read(settings, keys::API_BASE_URL).await;
            stored.timeout_secs = read(settings, keys::API_TIMEOUT_SECS).await;
            stored.filter_employee = read::<Option<u64>>(settings, keys::FILTER_EMPLOYEE)
                .await
                .flatten();
        }

        let config = resolve(env_url, stored);
        info!(
            "api root {} (timeout {:?})",
            config.base_url, config.timeout
        );
        config
    }
}

async fn read<T: serde::de::DeserializeOwned>(settings: &SettingsProvider, key: &str) -> Option<T> {
    match settings.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!("ignoring setting {key}: {e}");
            None
        }
    }
}

#[derive(Debug, Default)]
struct StoredSettings {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    filter_employee: Option<u64>,
}

fn resolve(env_url: Option<String>, stored: StoredSettings) -> Config {
    let base_url = [env_url, stored.base_url]
        .into_iter()
        .flatten()
        .map(|url| url.trim().to_string())
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = stored
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    Config {
        base_url,
        timeout,
        filter_employee: stored.filter_employee,
    }
}
