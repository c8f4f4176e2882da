//! Settings for the KSeF client and authentication engine

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{BASE_PATH, DEFAULT_HOST};

/// Network settings for the resilient API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// API host without scheme, e.g. `api.ksef.mf.gov.pl`
    pub host: String,

    /// Full base URL override (scheme + host + path). Takes precedence over
    /// `host` when set.
    pub base_url: Option<String>,

    /// Retries after the first attempt for 5xx and transport failures
    pub max_retries: u32,

    pub timeouts: Timeouts,

    /// Backoff base in milliseconds; retry i+1 waits `base * 2^i`
    pub backoff_base_ms: u64,
}

impl ClientSettings {
    /// Settings pointing at an explicit base URL (test servers, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: Some(base_url.into()), ..Self::default() }
    }

    /// Resolved base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}{}", self.host.trim_end_matches('/'), BASE_PATH),
        }
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            base_url: None,
            max_retries: 3,
            timeouts: Timeouts::default(),
            backoff_base_ms: 200,
        }
    }
}

/// Per-attempt timeouts in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub open_secs: u64,
    pub read_secs: u64,
    pub write_secs: u64,
}

impl Timeouts {
    /// Connection establishment bound.
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.open_secs)
    }

    /// Whole-request bound once connected (send + receive).
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.read_secs.saturating_add(self.write_secs))
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { open_secs: 10, read_secs: 15, write_secs: 10 }
    }
}

/// Status polling bounds for the authentication engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
}

impl AuthConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { poll_max_attempts: 10, poll_interval_ms: 1_000 }
    }
}
