//! Classification of annotated client payloads
//!
//! The client never raises for HTTP failures. Non-2xx responses come back as
//! JSON objects carrying `error` and `http_status`; these helpers turn such
//! payloads back into typed values.

use std::fmt;

use ksef_domain::constants::{PAYLOAD_ERROR_KEY, PAYLOAD_HTTP_STATUS_KEY};
use serde_json::Value;

/// Error message carried by a payload, if any.
///
/// Only objects are inspected; `null` and `false` count as no error.
pub fn payload_error(payload: &Value) -> Option<String> {
    match payload.as_object()?.get(PAYLOAD_ERROR_KEY)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// HTTP status annotation of a payload, if any.
pub fn payload_status(payload: &Value) -> Option<u16> {
    payload
        .as_object()?
        .get(PAYLOAD_HTTP_STATUS_KEY)?
        .as_u64()
        .and_then(|status| u16::try_from(status).ok())
}

/// Failure described by an annotated payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadFailure {
    /// 4xx response; never retried
    ClientError { status: u16, message: String },
    /// 5xx response that persisted through every retry
    ServerError { status: u16, message: String },
    /// Error without a usable status (empty or malformed 2xx bodies, or a
    /// server-side error field in a 2xx response)
    Unexpected { message: String },
}

impl PayloadFailure {
    /// Classify `payload`, returning `None` when it carries no error.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let message = payload_error(payload)?;
        Some(match payload_status(payload) {
            Some(status @ 400..=499) => Self::ClientError { status, message },
            Some(status @ 500..=599) => Self::ServerError { status, message },
            _ => Self::Unexpected { message },
        })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => Some(*status),
            Self::Unexpected { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ClientError { message, .. }
            | Self::ServerError { message, .. }
            | Self::Unexpected { message } => message,
        }
    }
}

impl fmt::Display for PayloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{} (HTTP {status})", self.message()),
            None => f.write_str(self.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_field_forms() {
        assert_eq!(payload_error(&json!({"error": "boom"})).as_deref(), Some("boom"));
        assert_eq!(
            payload_error(&json!({"error": {"code": 21}})).as_deref(),
            Some(r#"{"code":21}"#)
        );
        assert_eq!(payload_error(&json!({"error": null})), None);
        assert_eq!(payload_error(&json!({"ok": true})), None);
        assert_eq!(payload_error(&json!(["error"])), None);
    }

    #[test]
    fn classifies_by_status() {
        let client =
            PayloadFailure::from_payload(&json!({"error": "HTTP 404", "http_status": 404}));
        assert_eq!(
            client,
            Some(PayloadFailure::ClientError { status: 404, message: "HTTP 404".into() })
        );

        let server =
            PayloadFailure::from_payload(&json!({"error": "down", "http_status": 503})).unwrap();
        assert_eq!(server.status(), Some(503));
        assert_eq!(server.to_string(), "down (HTTP 503)");

        let unexpected =
            PayloadFailure::from_payload(&json!({"error": "Empty response (HTTP 200)"})).unwrap();
        assert_eq!(
            unexpected,
            PayloadFailure::Unexpected { message: "Empty response (HTTP 200)".into() }
        );
    }

    #[test]
    fn success_payload_is_not_a_failure() {
        assert_eq!(PayloadFailure::from_payload(&json!({"challenge": "c"})), None);
    }
}
