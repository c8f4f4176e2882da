//! Modular common utilities shared across KSeF crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: privacy (audit log sanitization)
//! - `runtime`: time abstractions (clock, sleeper)
//! - `test-utils`: deterministic clock and recording sleeper

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod privacy;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use privacy::sanitizer::{sanitize_body, sanitize_headers, REDACTED_VALUE};
#[cfg(feature = "runtime")]
pub use time::{Clock, Sleeper, SystemClock, ThreadSleeper};
