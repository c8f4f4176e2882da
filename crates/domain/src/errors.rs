//! Error types used throughout the KSeF crates
//!
//! Server (5xx) and client (4xx) HTTP failures are deliberately absent here:
//! the client surfaces them as annotated payloads, never as errors. See
//! `ksef_core::PayloadFailure` for their classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_domain_enum_conversions;

/// Main error type for KSeF operations
#[derive(Error, Debug)]
pub enum KsefError {
    /// Network-level failure that survived every retry
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication-stage precondition failure; never retried
    #[error("{message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Box<KsefError>>,
    },

    /// Malformed invoice XML, query or response shape
    #[error("Invoice data error: {0}")]
    Data(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KsefError {
    /// Build a protocol error without an underlying cause.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol { message: message.into(), source: None }
    }

    /// Build a protocol error that wraps the error raised by a lower layer.
    pub fn protocol_caused_by(message: impl Into<String>, source: KsefError) -> Self {
        Self::Protocol { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Stable label suitable for logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Protocol { .. } => "protocol",
            Self::Data(_) => "data",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
        }
    }

    /// Transport error carried by this error, directly or as a protocol cause.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Protocol { source: Some(source), .. } => source.transport(),
            _ => None,
        }
    }
}

/// Classification of network failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Connect,
    Dns,
    Tls,
    Reset,
    Timeout,
    /// Response body could not be read to the end
    Body,
    /// Request could not be built; nothing was sent
    Request,
}

impl_domain_enum_conversions!(TransportErrorKind {
    Connect => "connect",
    Dns => "dns",
    Tls => "tls",
    Reset => "reset",
    Timeout => "timeout",
    Body => "body",
    Request => "request",
});

/// Failure to obtain any HTTP response for one attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} failure: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Whether another attempt may succeed. Only request construction
    /// failures are permanent.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.kind, TransportErrorKind::Request)
    }
}

/// Result type alias for KSeF operations
pub type Result<T> = std::result::Result<T, KsefError>;
