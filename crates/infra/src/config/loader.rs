//! Configuration loader
//!
//! Loads client and authentication settings from environment variables or
//! a config file.
//!
//! ## Loading Strategy
//! 1. If `KSEF_CONFIG` names a file, load from that file
//! 2. Otherwise read environment variables on top of the defaults
//!
//! ## Environment Variables
//! - `KSEF_HOST`: API host (default `api.ksef.mf.gov.pl`)
//! - `KSEF_BASE_URL`: full base URL override
//! - `KSEF_MAX_RETRIES`: retries after the first attempt
//! - `KSEF_OPEN_TIMEOUT`: connect timeout in seconds
//! - `KSEF_READ_TIMEOUT`: read timeout in seconds
//! - `KSEF_WRITE_TIMEOUT`: write timeout in seconds
//! - `KSEF_POLL_MAX_ATTEMPTS`: authentication status polls
//! - `KSEF_POLL_INTERVAL_MS`: pause between status polls
//!
//! Unparseable numbers are ignored with a warning and the default is kept.
//!
//! ## File Format
//! TOML (or JSON, by extension) with a `[settings]` table shaped like
//! `ClientSettings` and an optional `[auth]` table.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ksef_core::SettingsProvider;
use ksef_domain::{AuthConfig, ClientSettings, KsefError, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming a config file for [`load`].
pub const CONFIG_PATH_ENV: &str = "KSEF_CONFIG";

/// Complete loaded configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KsefConfig {
    pub settings: ClientSettings,
    pub auth: AuthConfig,
}

impl SettingsProvider for KsefConfig {
    fn client_settings(&self) -> ClientSettings {
        self.settings.clone()
    }

    fn auth_config(&self) -> AuthConfig {
        self.auth
    }
}

/// Load configuration from `KSEF_CONFIG` when set, else from the environment.
///
/// # Errors
/// Returns `KsefError::Config` if `KSEF_CONFIG` points at a missing or
/// invalid file.
pub fn load() -> Result<KsefConfig> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_from_file(PathBuf::from(path.trim())),
        _ => {
            let config = load_from_env()?;
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// Missing variables keep their defaults.
///
/// # Errors
/// Currently infallible; the `Result` keeps the loader signatures uniform.
pub fn load_from_env() -> Result<KsefConfig> {
    let mut config = KsefConfig::default();
    let settings = &mut config.settings;

    if let Some(host) = env_string("KSEF_HOST") {
        settings.host = host;
    }
    if let Some(base_url) = env_string("KSEF_BASE_URL") {
        settings.base_url = Some(base_url);
    }
    settings.max_retries = env_number("KSEF_MAX_RETRIES", settings.max_retries);
    settings.timeouts.open_secs = env_number("KSEF_OPEN_TIMEOUT", settings.timeouts.open_secs);
    settings.timeouts.read_secs = env_number("KSEF_READ_TIMEOUT", settings.timeouts.read_secs);
    settings.timeouts.write_secs = env_number("KSEF_WRITE_TIMEOUT", settings.timeouts.write_secs);

    config.auth.poll_max_attempts =
        env_number("KSEF_POLL_MAX_ATTEMPTS", config.auth.poll_max_attempts);
    config.auth.poll_interval_ms =
        env_number("KSEF_POLL_INTERVAL_MS", config.auth.poll_interval_ms);

    Ok(config)
}

/// Load configuration from a file
///
/// Format is detected by extension: `.json`, anything else is TOML.
///
/// # Errors
/// Returns `KsefError::Config` if the file is missing, unreadable or invalid.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<KsefConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(KsefError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| KsefError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<KsefConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "json" => serde_json::from_str(contents)
            .map_err(|e| KsefError::Config(format!("Invalid JSON format: {e}"))),
        _ => toml::from_str(contents)
            .map_err(|e| KsefError::Config(format!("Invalid TOML format: {e}"))),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_number<T: FromStr>(key: &str, default: T) -> T {
    match env_string(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring invalid numeric setting");
            default
        }),
        None => default,
    }
}
