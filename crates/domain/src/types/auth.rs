//! Authentication protocol values

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single-use server challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub value: String,
    /// Server timestamp in epoch milliseconds
    pub timestamp_ms: i64,
}

/// Intermediate credentials used to poll status and redeem tokens
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticationTicket {
    pub reference_number: String,
    pub authentication_token: String,
}

impl fmt::Debug for AuthenticationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationTicket")
            .field("reference_number", &self.reference_number)
            .field("authentication_token", &"[REDACTED]")
            .finish()
    }
}

/// Tokens returned by a successful authentication
///
/// Validity timestamps are kept as the text the server returned.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_valid_until: Option<String>,
    pub refresh_token: Option<String>,
    pub refresh_token_valid_until: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("access_token_valid_until", &self.access_token_valid_until)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token_valid_until", &self.refresh_token_valid_until)
            .finish()
    }
}

/// Caller-owned view of an authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    tokens: TokenPair,
}

impl Session {
    pub fn new(tokens: TokenPair) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &TokenPair {
        &self.tokens
    }

    pub fn access_token(&self) -> &str {
        &self.tokens.access_token
    }

    /// True while an access token is held and has not expired at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.tokens.access_token.is_empty() && !self.is_expired(now)
    }

    /// Expired only when the validity parses and lies before `now`.
    /// Missing or unparseable validity counts as not expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.tokens
            .access_token_valid_until
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .is_some_and(|valid_until| valid_until < now)
    }
}

impl From<TokenPair> for Session {
    fn from(tokens: TokenPair) -> Self {
        Self::new(tokens)
    }
}
