//! KSeF token authentication
//!
//! [`AuthEngine`] drives the six-stage login over any [`ksef_core::KsefApi`].

pub mod certificate;
pub mod crypto;
pub mod engine;

pub use certificate::EncryptionCertificate;
pub use crypto::encrypt_token;
pub use engine::AuthEngine;
