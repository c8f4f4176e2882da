//! Tracing subscriber setup
//!
//! Installs a `fmt` subscriber on stderr filtered by `RUST_LOG` (default
//! `info`). Audit entries from [`crate::audit::TracingApiLogSink`] use the
//! `ksef::api` target, so `RUST_LOG=ksef::api=info` isolates them.

use ksef_domain::{KsefError, Result};
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns `KsefError::Config` when a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match format {
        LogFormat::Human => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed
        .map_err(|err| KsefError::Config(format!("Failed to install tracing subscriber: {err}")))
}
