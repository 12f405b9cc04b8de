//! Client configuration options.

use std::time::Duration;

/// Options for configuring the tinycache client.
///
/// # Example
///
/// ```rust
/// use tinycache_client::TinyCacheClientOptions;
/// use std::time::Duration;
///
/// let options = TinyCacheClientOptions::new("http://localhost:9000")
///     .with_timeout(Duration::from_secs(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TinyCacheClientOptions {
    /// The server URL (e.g., "http://localhost:9000")
    pub url: String,

    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl TinyCacheClientOptions {
    /// Create new options with the given server URL and a one second timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Some(Duration::from_secs(1)),
        }
    }

    /// Set the per-request timeout. A zero duration disables the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Create options from environment variables.
    ///
    /// Reads `TINYCACHE_SERVER_URL` (defaults to "http://127.0.0.1:9000").
    pub fn from_env() -> Self {
        let url = std::env::var("TINYCACHE_SERVER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string());
        Self::new(url)
    }
}

impl Default for TinyCacheClientOptions {
    fn default() -> Self {
        Self::new("http://127.0.0.1:9000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = TinyCacheClientOptions::default();
        assert_eq!(options.url, "http://127.0.0.1:9000");
        assert_eq!(options.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let options = TinyCacheClientOptions::new("http://cache:9000").with_timeout(Duration::ZERO);
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn test_custom_timeout() {
        let options =
            TinyCacheClientOptions::new("http://cache:9000").with_timeout(Duration::from_millis(300));
        assert_eq!(options.timeout, Some(Duration::from_millis(300)));
    }
}
