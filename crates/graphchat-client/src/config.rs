//! Backend endpoint configuration.

use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5010";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the backend REST API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout applied to every call.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from the environment.
    ///
    /// `GRAPHCHAT_BASE_URL` overrides the default endpoint; the default is
    /// used when unset.
    pub fn from_env() -> Self {
        let base_url =
            env::var("GRAPHCHAT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
