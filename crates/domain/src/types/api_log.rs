//! Audit record of one logical API call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::http::{Headers, HttpMethod};

/// Immutable audit entry
///
/// Headers and bodies are stored already sanitized. `status` is 0 when no
/// HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiLogEntry {
    pub timestamp: DateTime<Utc>,
    pub method: HttpMethod,
    pub path: String,
    pub status: u16,
    pub duration_ms: u64,
    pub request_headers: Headers,
    pub request_body: Option<String>,
    pub response_headers: Headers,
    pub response_body: Option<String>,
    pub error: Option<String>,
}

impl ApiLogEntry {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: u16) -> ApiLogEntry {
        ApiLogEntry {
            timestamp: Utc::now(),
            method: HttpMethod::Get,
            path: "/auth/challenge".into(),
            status,
            duration_ms: 12,
            request_headers: Headers::new(),
            request_body: None,
            response_headers: Headers::new(),
            response_body: None,
            error: None,
        }
    }

    #[test]
    fn success_is_2xx_only() {
        assert!(entry(200).is_success());
        assert!(entry(204).is_success());
        assert!(!entry(0).is_success());
        assert!(!entry(302).is_success());
        assert!(!entry(503).is_success());
    }
}
