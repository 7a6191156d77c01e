mod app;
mod config;
mod error;
#[cfg(test)]
mod mock_api;
mod paths;
mod settings;
mod store;
mod terminal;
mod wakeup;

use std::fs::File;

use hrms_lib::HrmsClient;
use log::{error, info, warn};
use simplelog::{LevelFilter, WriteLogger};

use crate::app::App;
use crate::config::{Config, LOG_LEVEL_ENV};
use crate::error::AppError;
use crate::settings::SettingsProvider;
use crate::terminal::TerminalGuard;

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        error!("fatal: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };
    let level = parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    let _ = WriteLogger::init(level, simplelog::Config::default(), file);
}

/// `HRMS_LOG` value to a level filter; unset or unknown means `Debug`.
fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Debug)
}

async fn open_settings() -> Option<SettingsProvider> {
    let path = paths::settings_db()?;
    match SettingsProvider::open(&path).await {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!("settings unavailable, using defaults: {e}");
            None
        }
    }
}

async fn run() -> Result<(), AppError> {
    let settings = open_settings().await;
    let config = Config::load(settings.as_ref()).await;

    let client = HrmsClient::builder()
        .base_url(config.base_url.as_str())
        .timeout(config.timeout)
        .build()?;

    let mut terminal = TerminalGuard::new()?;
    let size = terminal.size()?;
    let (wakeup, wakeup_rx) = wakeup::channel();
    let app = App::new(client, settings, config.filter_employee, size, wakeup);

    info!("starting attendance screen ({}x{})", size.0, size.1);
    app.run(&mut terminal, wakeup_rx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_level(None), LevelFilter::Debug);
        assert_eq!(parse_level(Some("warn")), LevelFilter::Warn);
        assert_eq!(parse_level(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Debug);
    }
}
