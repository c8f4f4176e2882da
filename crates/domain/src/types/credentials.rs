//! Taxpayer login credentials

use std::fmt;

use crate::errors::{KsefError, Result};

/// Taxpayer id (NIP) plus the pre-shared KSeF token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    nip: String,
    secret_token: String,
}

impl Credentials {
    /// Build credentials, keeping only the digits of `nip`.
    ///
    /// # Errors
    ///
    /// Returns [`KsefError::InvalidInput`] when the id has no digits or the
    /// secret is blank.
    pub fn new(nip: &str, secret_token: &str) -> Result<Self> {
        let nip: String = nip.chars().filter(char::is_ascii_digit).collect();
        if nip.is_empty() {
            return Err(KsefError::InvalidInput("nip is required".into()));
        }

        let secret_token = secret_token.trim();
        if secret_token.is_empty() {
            return Err(KsefError::InvalidInput("secret token is required".into()));
        }

        Ok(Self { nip, secret_token: secret_token.to_string() })
    }

    pub fn nip(&self) -> &str {
        &self.nip
    }

    pub fn secret_token(&self) -> &str {
        &self.secret_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("nip", &self.nip)
            .field("secret_token", &"[REDACTED]")
            .finish()
    }
}
