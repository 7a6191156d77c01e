//! User-facing notifications.
//!
//! Anything that needs to tell the user about an outcome (a save that
//! succeeded, a request that failed) pushes an [`Alert`] into an
//! [`AlertSink`]. The host drains the [`AlertQueue`] when it renders.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::info;

/// Default time an alert stays visible.
pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
    Info,
}

/// A transient message.
///
/// # Example
///
/// ```ignore
/// alerts.push(Alert::success("Attendance updated"));
/// alerts.push(Alert::error("Employee not found").with_duration(Duration::from_secs(8)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
    pub duration: Duration,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            duration: DEFAULT_ALERT_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, message)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl From<String> for Alert {
    fn from(message: String) -> Self {
        Alert::info(message)
    }
}

impl From<&str> for Alert {
    fn from(message: &str) -> Self {
        Alert::info(message)
    }
}

/// Destination for alerts.
pub trait AlertSink: Send + Sync {
    fn push(&self, alert: Alert);
}

/// In-memory alert queue with expiry. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct AlertQueue {
    entries: Arc<Mutex<Vec<(Alert, Instant)>>>,
}

impl AlertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts still visible at `now`, oldest first. Expired ones are dropped.
    pub fn current(&self, now: Instant) -> Vec<Alert> {
        let Ok(mut entries) = self.entries.lock() else {
            return Vec::new();
        };
        entries.retain(|(alert, created)| now.saturating_duration_since(*created) < alert.duration);
        entries.iter().map(|(alert, _)| alert.clone()).collect()
    }

    /// Earliest instant at which a visible alert expires.
    pub fn next_expiry(&self) -> Option<Instant> {
        let entries = self.entries.lock().ok()?;
        entries
            .iter()
            .map(|(alert, created)| *created + alert.duration)
            .min()
    }

    /// Everything pushed and not yet pruned, regardless of expiry.
    pub fn all(&self) -> Vec<Alert> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(|(alert, _)| alert.clone()).collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl AlertSink for AlertQueue {
    fn push(&self, alert: Alert) {
        info!("alert ({:?}): {}", alert.level, alert.message);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((alert, Instant::now()));
        }
    }
}
