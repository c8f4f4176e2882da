//! Invoice normalization and lookup
//!
//! - [`xml`]: full documents in the FA and UBL dialects
//! - [`metadata`]: partial entries returned by the metadata query
//! - [`service`]: `find` / `find_all` over the [`crate::KsefApi`] port

mod amount;
pub mod metadata;
pub mod service;
mod tree;
pub mod xml;
