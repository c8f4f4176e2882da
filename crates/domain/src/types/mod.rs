//! Domain value objects
//!
//! Everything here is plain data: no I/O, no clocks. Construction-time
//! validation lives next to each type.

pub mod api_log;
pub mod auth;
pub mod credentials;
pub mod http;
pub mod invoice;

pub use api_log::ApiLogEntry;
pub use auth::{AuthenticationTicket, Challenge, Session, TokenPair};
pub use credentials::Credentials;
pub use http::{Bearer, Headers, HttpMethod, XmlResponse};
pub use invoice::{DataSource, InvoiceLineItem, InvoiceRecord, Party};
