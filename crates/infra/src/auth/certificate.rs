//! Selection and parsing of the KSeF token-encryption certificate

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use ksef_core::payload_error;
use ksef_domain::constants::USAGE_KSEF_TOKEN_ENCRYPTION;
use ksef_domain::{KsefError, Result};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use serde_json::Value;
use x509_parser::prelude::{FromDer, X509Certificate};

/// Public key and expiry of the certificate used for token encryption
#[derive(Debug, Clone)]
pub struct EncryptionCertificate {
    public_key: RsaPublicKey,
    not_after: DateTime<Utc>,
}

impl EncryptionCertificate {
    /// Pick the token-encryption entry out of a certificate listing.
    ///
    /// # Errors
    ///
    /// Returns [`KsefError::Protocol`] for error payloads, non-array
    /// listings, a missing token-encryption entry or an unparseable
    /// certificate.
    pub fn from_listing(listing: &Value) -> Result<Self> {
        if let Some(error) = payload_error(listing) {
            return Err(KsefError::protocol(format!("Certificate fetch failed: {error}")));
        }
        let entries = listing
            .as_array()
            .ok_or_else(|| KsefError::protocol("Invalid certificate response"))?;

        let entry = entries
            .iter()
            .find(|entry| has_encryption_usage(entry))
            .ok_or_else(|| KsefError::protocol("No encryption certificate found"))?;

        let encoded = entry
            .get("certificate")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing certificate data"))?;

        Self::from_base64_der(encoded)
    }

    /// Parse a base64-encoded DER X.509 certificate carrying an RSA key.
    ///
    /// # Errors
    ///
    /// Returns [`KsefError::Protocol`] when decoding or parsing fails.
    pub fn from_base64_der(encoded: &str) -> Result<Self> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let der = STANDARD.decode(compact).map_err(invalid)?;
        Self::from_der(&der)
    }

    /// # Errors
    ///
    /// Returns [`KsefError::Protocol`] when the certificate or its key
    /// cannot be parsed.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, certificate) = X509Certificate::from_der(der).map_err(invalid)?;

        let public_key = RsaPublicKey::from_public_key_der(certificate.public_key().raw)
            .map_err(invalid)?;

        let expires_at = certificate.validity().not_after.timestamp();
        let not_after = DateTime::<Utc>::from_timestamp(expires_at, 0)
            .ok_or_else(|| invalid(format!("expiry out of range: {expires_at}")))?;

        Ok(Self { public_key, not_after })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_after
    }

    /// # Errors
    ///
    /// Returns [`KsefError::Protocol`] naming the expiry date when `now` is
    /// at or past it.
    pub fn ensure_valid_at(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_expired_at(now) {
            return Err(KsefError::protocol(format!(
                "Encryption certificate expired on {}",
                self.not_after.to_rfc3339_opts(SecondsFormat::Secs, true)
            )));
        }
        Ok(())
    }
}

fn has_encryption_usage(entry: &Value) -> bool {
    entry
        .get("usage")
        .and_then(Value::as_array)
        .is_some_and(|usage| usage.iter().any(|u| u.as_str() == Some(USAGE_KSEF_TOKEN_ENCRYPTION)))
}

fn invalid(err: impl std::fmt::Display) -> KsefError {
    KsefError::protocol(format!("Invalid encryption certificate: {err}"))
}
