//! Retry configuration for idempotent requests.

use std::time::Duration;

/// Automatic retry behaviour.
///
/// Only idempotent requests (`GET`, `DELETE`) are retried. Writes such as
/// marking or updating attendance are never repeated behind the caller's
/// back.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use hrms_lib::retry::RetryConfig;
///
/// let custom = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(100));
///
/// let none = RetryConfig::no_retry();
/// assert_eq!(none.max_retries, 0);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt).
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub retry_on_5xx: bool,
    pub retry_on_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            retry_on_5xx: true,
            retry_on_network: true,
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on_5xx: false,
            retry_on_network: false,
            ..Default::default()
        }
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn retry_on_5xx(mut self, enabled: bool) -> Self {
        self.retry_on_5xx = enabled;
        self
    }

    pub fn retry_on_network(mut self, enabled: bool) -> Self {
        self.retry_on_network = enabled;
        self
    }

    /// Delay after `delay`, doubled and capped.
    pub(crate) fn next_delay(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig::default().max_delay(Duration::from_millis(600));
        let second = config.next_delay(config.initial_delay);
        assert_eq!(second, Duration::from_millis(500));
        assert_eq!(config.next_delay(second), Duration::from_millis(600));
    }
}
