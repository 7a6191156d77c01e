//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "hrms";
const APPLICATION: &str = "hrms-tui";

/// Name of the log file the running instance writes to.
const LATEST_LOG: &str = "latest.log";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Persistent application data.
///
/// - Linux: `$XDG_DATA_HOME/hrms-tui` or `~/.local/share/hrms-tui`
/// - macOS: `~/Library/Application Support/dev.hrms.hrms-tui`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Regenerable data (logs).
///
/// - Linux: `$XDG_CACHE_HOME/hrms-tui` or `~/.cache/hrms-tui`
/// - macOS: `~/Library/Caches/dev.hrms.hrms-tui`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the settings database.
pub fn settings_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("settings.db"))
}

/// Path to the log file of the running instance.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Rename the previous `latest.log` to a timestamped name and prune old logs.
///
/// Call at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    let _ = fs::create_dir_all(&cache);
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    rotate_logs_in(&cache, &timestamp);
}

fn rotate_logs_in(dir: &Path, timestamp: &str) {
    let latest = dir.join(LATEST_LOG);
    if latest.exists() {
        let archived = dir.join(format!("{timestamp}.log"));
        let _ = fs::rename(&latest, &archived);
    }
    cleanup_old_logs(dir, MAX_OLD_LOGS);
}

/// Remove the oldest archived logs, keeping `keep` of them.
fn cleanup_old_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    // Timestamped names sort chronologically; mtime breaks ties for foreign files.
    logs.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));

    if logs.len() > keep {
        for entry in logs.iter().take(logs.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hrms-tui-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_rotate_archives_latest() {
        let dir = scratch_dir("rotate");
        fs::write(dir.join(LATEST_LOG), "previous run").unwrap();

        rotate_logs_in(&dir, "20250210_081500");

        assert!(!dir.join(LATEST_LOG).exists());
        assert_eq!(
            fs::read_to_string(dir.join("20250210_081500.log")).unwrap(),
            "previous run"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cleanup_keeps_limit() {
        let dir = scratch_dir("cleanup");
        for i in 0..5 {
            fs::write(dir.join(format!("2025020{i}_000000.log")), "").unwrap();
        }
        fs::write(dir.join(LATEST_LOG), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        cleanup_old_logs(&dir, 2);

        let mut remaining: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        remaining.sort();
        assert_eq!(remaining.len(), 4);
        assert!(remaining.contains(&LATEST_LOG.to_string()));
        assert!(remaining.contains(&"notes.txt".to_string()));
        fs::remove_dir_all(&dir).unwrap();
    }
}
