//! Token encryption for the KSeF token login

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ksef_domain::{KsefError, Result};
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;

/// Plaintext sent to KSeF: `<secret>|<challenge timestamp ms>`.
pub fn token_plaintext(secret: &str, timestamp_ms: i64) -> String {
    format!("{secret}|{timestamp_ms}")
}

/// Encrypt the token plaintext with RSA-OAEP (SHA-256, MGF1-SHA-256) and
/// return standard base64 without line breaks.
///
/// # Errors
///
/// Returns [`KsefError::Protocol`] when the plaintext does not fit the key.
pub fn encrypt_token(public_key: &RsaPublicKey, secret: &str, timestamp_ms: i64) -> Result<String> {
    let plaintext = token_plaintext(secret, timestamp_ms);
    let mut rng = rand::thread_rng();
    let ciphertext = public_key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext.as_bytes())
        .map_err(|err| KsefError::protocol(format!("Token encryption failed: {err}")))?;
    Ok(STANDARD.encode(ciphertext))
}
