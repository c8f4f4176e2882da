//! # KSeF Domain
//!
//! Value objects and error taxonomy shared by every KSeF crate.
//!
//! This crate contains:
//! - Authentication value objects (credentials, challenge, tokens, session)
//! - HTTP-facing value objects (methods, bearer selection, audit entries)
//! - Canonical invoice records
//! - Network and authentication settings
//! - The `KsefError` taxonomy and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other KSeF crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
