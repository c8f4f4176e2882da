use ksef_core::ApiLogSink;
use ksef_domain::ApiLogEntry;
use tracing::{info, warn};

/// Emits each audit entry as a structured event on target `ksef::api`
///
/// Entries arrive already sanitized; bodies are not forwarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingApiLogSink;

impl ApiLogSink for TracingApiLogSink {
    fn record(&self, entry: ApiLogEntry) {
        match &entry.error {
            Some(error) => warn!(
                target: "ksef::api",
                method = %entry.method,
                path = %entry.path,
                status = entry.status,
                duration_ms = entry.duration_ms,
                error = %error,
                "KSeF API call failed"
            ),
            None => info!(
                target: "ksef::api",
                method = %entry.method,
                path = %entry.path,
                status = entry.status,
                duration_ms = entry.duration_ms,
                "KSeF API call"
            ),
        }
    }
}
