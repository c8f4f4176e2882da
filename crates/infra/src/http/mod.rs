//! HTTP layer for the KSeF API
//!
//! [`KsefClient`] owns the retry policy, payload annotation and audit
//! logging; [`HttpTransport`] performs a single attempt.

pub mod client;
pub mod response;
pub mod transport;

pub use client::{KsefClient, KsefClientBuilder};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
