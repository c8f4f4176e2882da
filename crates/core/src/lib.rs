//! # KSeF Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the API client, token storage,
//!   audit logging and settings
//! - Payload classification helpers for annotated client responses
//! - The invoice normalizer (XML dialects and JSON metadata)
//! - Invoice lookup services built on the API port
//!
//! ## Architecture Principles
//! - Only depends on `ksef-domain`
//! - No HTTP, crypto or platform code
//! - All external dependencies via traits

pub mod api;
pub mod invoice;

// Re-export specific items to avoid ambiguity
pub use api::payload::{payload_error, PayloadFailure};
pub use api::ports::{ApiLogSink, KsefApi, SettingsProvider, TokenSink};
pub use invoice::metadata::from_json_metadata;
pub use invoice::service::{InvoiceQuery, InvoiceService};
pub use invoice::xml::InvoiceXmlMapper;
