//! # KSeF Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The resilient blocking HTTP client (`reqwest`)
//! - The token authentication engine (X.509, RSA-OAEP)
//! - Audit log sinks
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `ksef-core`
//! - Depends on `ksef-common` and `ksef-core`
//! - Contains all "impure" code (network, crypto, environment)

pub mod audit;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use audit::{MemoryApiLog, TracingApiLogSink};
pub use auth::AuthEngine;
pub use config::KsefConfig;
pub use http::{KsefClient, KsefClientBuilder};
