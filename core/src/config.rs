//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Where the cart service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` waits indefinitely.
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: Option<u64>,
}

fn default_timeout_ms() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_MS)
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_ms: default_timeout_ms(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.request_timeout_ms = None;
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Reads `CART_BASE_URL` (default: same origin, empty base) and
    /// `CART_TIMEOUT_MS` (`0` disables the timeout).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CART_BASE_URL").unwrap_or_default();
        let request_timeout_ms = match lookup("CART_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            Some(0) => None,
            Some(ms) => Some(ms),
            None => default_timeout_ms(),
        };
        Self {
            base_url,
            request_timeout_ms,
        }
    }
}
