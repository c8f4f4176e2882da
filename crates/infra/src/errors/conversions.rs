//! Conversions from external infrastructure errors into domain errors.

use ksef_domain::{TransportError, TransportErrorKind};
use reqwest::Error as HttpError;

/// Classification of client library failures into transport errors.
pub trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        let detail = error_chain(&self);
        let lower = detail.to_ascii_lowercase();

        let kind = if self.is_builder() {
            TransportErrorKind::Request
        } else if self.is_timeout() {
            TransportErrorKind::Timeout
        } else if self.is_body() || self.is_decode() {
            TransportErrorKind::Body
        } else if looks_like_dns(&lower) {
            TransportErrorKind::Dns
        } else if looks_like_tls(&lower) {
            TransportErrorKind::Tls
        } else if self.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Reset
        };

        TransportError::new(kind, detail)
    }
}

/// Error message followed by every source message, joined with `: `.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn looks_like_dns(message: &str) -> bool {
    message.contains("dns error") || message.contains("failed to lookup address")
}

fn looks_like_tls(message: &str) -> bool {
    message.contains("tls") || message.contains("certificate") || message.contains("handshake")
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
