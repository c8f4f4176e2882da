//! Privacy Module
//!
//! Redaction of secrets in audit log material (headers and bodies) before it
//! is stored or displayed.

pub mod sanitizer;

pub use sanitizer::{sanitize_body, sanitize_headers, sanitize_text, REDACTED_VALUE};
