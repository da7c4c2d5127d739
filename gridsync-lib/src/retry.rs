//! Retry policy for endpoint requests.

use std::time::Duration;

/// Retry policy applied by [`HttpTransport`](crate::transport::HttpTransport).
///
/// Page requests are state-changing, so the transport does not retry unless
/// the caller opts in. When enabled, the delay doubles after each attempt up
/// to `max_delay`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridsync_lib::retry::RetryConfig;
///
/// // Default: no retries
/// let config = RetryConfig::default();
/// assert_eq!(config.max_retries, 0);
///
/// // Two retries on transient failures
/// let bounded = RetryConfig::bounded(2)
///     .initial_delay(Duration::from_millis(250))
///     .max_delay(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Whether to retry on HTTP 429.
    pub retry_on_429: bool,
    /// Whether to retry on HTTP 5xx.
    pub retry_on_5xx: bool,
    /// Whether to retry on network errors and timeouts.
    pub retry_on_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    /// Creates a config with all retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            retry_on_429: false,
            retry_on_5xx: false,
            retry_on_network: false,
        }
    }

    /// Creates a config retrying every transient failure up to `n` times.
    pub fn bounded(n: u32) -> Self {
        Self {
            max_retries: n,
            retry_on_429: true,
            retry_on_5xx: true,
            retry_on_network: true,
            ..Self::no_retry()
        }
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial delay between retries.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enables or disables retry on HTTP 429.
    pub fn retry_on_429(mut self, enabled: bool) -> Self {
        self.retry_on_429 = enabled;
        self
    }

    /// Enables or disables retry on HTTP 5xx.
    pub fn retry_on_5xx(mut self, enabled: bool) -> Self {
        self.retry_on_5xx = enabled;
        self
    }

    /// Enables or disables retry on network errors.
    pub fn retry_on_network(mut self, enabled: bool) -> Self {
        self.retry_on_network = enabled;
        self
    }

    /// Returns `true` if a failure with `status` (or a network failure when
    /// `None`) should be retried after `attempts` retries already made.
    pub(crate) fn should_retry(&self, status: Option<u16>, attempts: u32) -> bool {
        if attempts >= self.max_retries {
            return false;
        }
        match status {
            Some(429) => self.retry_on_429,
            Some(s) if (500..600).contains(&s) => self.retry_on_5xx,
            Some(_) => false,
            None => self.retry_on_network,
        }
    }

    /// Returns the delay to wait before the next attempt.
    pub(crate) fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_retries() {
        let config = RetryConfig::default();
        assert!(!config.should_retry(Some(503), 0));
        assert!(!config.should_retry(None, 0));
    }

    #[test]
    fn test_bounded_stops_after_limit() {
        let config = RetryConfig::bounded(2);
        assert!(config.should_retry(Some(502), 0));
        assert!(config.should_retry(None, 1));
        assert!(!config.should_retry(Some(502), 2));
        assert!(!config.should_retry(Some(404), 0));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig::bounded(5).max_delay(Duration::from_secs(1));
        assert_eq!(
            config.next_delay(Duration::from_millis(400)),
            Duration::from_millis(800)
        );
        assert_eq!(config.next_delay(Duration::from_millis(800)), Duration::from_secs(1));
    }
}
