use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};
use ksef_common::time::{Clock, Sleeper, SystemClock, ThreadSleeper};
use ksef_core::{payload_error, KsefApi, TokenSink};
use ksef_domain::constants::{
    CONTEXT_IDENTIFIER_NIP, PATH_AUTH_CHALLENGE, PATH_AUTH_KSEF_TOKEN, PATH_AUTH_STATUS_PREFIX,
    PATH_AUTH_TOKEN_REDEEM, PATH_PUBLIC_KEY_CERTIFICATES,
};
use ksef_domain::{
    AuthConfig, AuthenticationTicket, Bearer, Challenge, Credentials, KsefError, Result, TokenPair,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::certificate::EncryptionCertificate;
use super::crypto::encrypt_token;

const CERTIFICATE_FETCH_FAILED: &str = "Certificate fetch failed";
const CHALLENGE_REQUEST_FAILED: &str = "Challenge request failed";
const AUTH_REQUEST_FAILED: &str = "Auth request failed";
const AUTH_STATUS_CHECK_FAILED: &str = "Auth status check failed";
const TOKEN_REDEEM_FAILED: &str = "Token redeem failed";

/// KSeF token login: certificate, challenge, encrypted token, status
/// polling and token redemption.
///
/// Holds no state between calls; each [`AuthEngine::authenticate`] runs the
/// whole exchange.
pub struct AuthEngine {
    api: Arc<dyn KsefApi>,
    token_sink: Option<Arc<dyn TokenSink>>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl AuthEngine {
    pub fn new(api: Arc<dyn KsefApi>) -> Self {
        Self {
            api,
            token_sink: None,
            sleeper: Arc::new(ThreadSleeper),
            clock: Arc::new(SystemClock),
            config: AuthConfig::default(),
        }
    }

    /// Push issued tokens into `sink` after every successful login.
    pub fn with_token_sink(mut self, sink: Arc<dyn TokenSink>) -> Self {
        self.token_sink = Some(sink);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full token login for `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`KsefError::Protocol`] when any stage fails. Transport
    /// failures are kept as the error source.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<TokenPair> {
        info!(nip = credentials.nip(), "starting KSeF authentication");

        let certificate = self.fetch_certificate()?;
        let challenge = self.obtain_challenge()?;
        let encrypted_token = encrypt_token(
            certificate.public_key(),
            credentials.secret_token(),
            challenge.timestamp_ms,
        )?;
        let ticket = self.submit(credentials, &challenge, &encrypted_token)?;
        self.wait_for_completion(&ticket)?;
        let tokens = self.redeem(&ticket)?;

        if let Some(sink) = &self.token_sink {
            sink.store_tokens(&tokens);
        }

        info!(
            nip = credentials.nip(),
            valid_until = tokens.access_token_valid_until.as_deref().unwrap_or("unknown"),
            has_refresh_token = tokens.refresh_token.is_some(),
            "KSeF authentication complete"
        );
        Ok(tokens)
    }

    fn fetch_certificate(&self) -> Result<EncryptionCertificate> {
        info!("fetching encryption certificate");
        let listing = self
            .api
            .get(PATH_PUBLIC_KEY_CERTIFICATES, Bearer::None)
            .map_err(|err| stage_failed(CERTIFICATE_FETCH_FAILED, err))?;

        let certificate = EncryptionCertificate::from_listing(&listing)?;
        certificate.ensure_valid_at(self.clock.utc_now())?;
        Ok(certificate)
    }

    fn obtain_challenge(&self) -> Result<Challenge> {
        info!("requesting authentication challenge");
        let response = self
            .api
            .post(PATH_AUTH_CHALLENGE, None, Bearer::None)
            .map_err(|err| stage_failed(CHALLENGE_REQUEST_FAILED, err))?;
        let response = expect_object(&response, "Challenge")?;

        if let Some(error) = error_field(response) {
            return Err(KsefError::protocol(format!("Challenge failed: {error}")));
        }

        let value =
            required_text(response.get("challenge"), "Challenge response missing challenge")?;
        let timestamp_ms = challenge_timestamp_ms(response)?;

        Ok(Challenge { value, timestamp_ms })
    }

    fn submit(
        &self,
        credentials: &Credentials,
        challenge: &Challenge,
        encrypted_token: &str,
    ) -> Result<AuthenticationTicket> {
        info!(nip = credentials.nip(), "submitting encrypted token");
        let body = json!({
            "contextIdentifier": { "type": CONTEXT_IDENTIFIER_NIP, "value": credentials.nip() },
            "challenge": challenge.value,
            "encryptedToken": encrypted_token,
        });
        let response = self
            .api
            .post(PATH_AUTH_KSEF_TOKEN, Some(&body), Bearer::None)
            .map_err(|err| stage_failed(AUTH_REQUEST_FAILED, err))?;
        let response = expect_object(&response, "Auth")?;

        if let Some(error) = error_field(response) {
            return Err(KsefError::protocol(format!("Auth failed: {error}")));
        }

        let authentication_token = required_text(
            response.get("authenticationToken").and_then(|token| token.get("token")),
            "No auth token in response",
        )?;
        let reference_number =
            required_text(response.get("referenceNumber"), "No reference number in response")?;

        Ok(AuthenticationTicket { reference_number, authentication_token })
    }

    fn wait_for_completion(&self, ticket: &AuthenticationTicket) -> Result<()> {
        let path = format!("{PATH_AUTH_STATUS_PREFIX}/{}", ticket.reference_number);
        let max_attempts = self.config.poll_max_attempts;
        info!(
            reference_number = %ticket.reference_number,
            max_attempts,
            "polling authentication status"
        );

        for attempt in 1..=max_attempts {
            let response = self
                .api
                .get(&path, Bearer::token(ticket.authentication_token.clone()))
                .map_err(|err| stage_failed(AUTH_STATUS_CHECK_FAILED, err))?;

            if let Some(error) = payload_error(&response) {
                warn!(attempt, error = %error, "authentication status check returned an error");
                return Err(KsefError::protocol(AUTH_STATUS_CHECK_FAILED));
            }

            let code = response.pointer("/status/code").and_then(Value::as_i64);
            debug!(attempt, code, "authentication status");
            match code {
                Some(200) => return Ok(()),
                Some(400..=599) => {
                    warn!(attempt, code, "authentication rejected");
                    return Err(KsefError::protocol(AUTH_STATUS_CHECK_FAILED));
                }
                _ => {}
            }

            if attempt < max_attempts {
                self.sleeper.sleep(self.config.poll_interval());
            }
        }

        warn!(max_attempts, "authentication still pending after polling");
        Err(KsefError::protocol(AUTH_STATUS_CHECK_FAILED))
    }

    fn redeem(&self, ticket: &AuthenticationTicket) -> Result<TokenPair> {
        info!(reference_number = %ticket.reference_number, "redeeming tokens");
        let response = self
            .api
            .post(
                PATH_AUTH_TOKEN_REDEEM,
                Some(&json!({})),
                Bearer::token(ticket.authentication_token.clone()),
            )
            .map_err(|err| stage_failed(TOKEN_REDEEM_FAILED, err))?;
        let response = expect_object(&response, "Token redeem")?;

        if let Some(error) = error_field(response) {
            return Err(KsefError::protocol(format!("Token redeem failed: {error}")));
        }

        let access = response.get("accessToken");
        let refresh = response.get("refreshToken").filter(|token| token.is_object());
        let access_field = |key: &str| access.and_then(|token| token.get(key));
        let refresh_field = |key: &str| refresh.and_then(|token| token.get(key));

        Ok(TokenPair {
            access_token: required_text(access_field("token"), "No access token in response")?,
            access_token_valid_until: optional_text(access_field("validUntil")),
            refresh_token: optional_text(refresh_field("token")),
            refresh_token_valid_until: optional_text(refresh_field("validUntil")),
        })
    }
}

impl std::fmt::Debug for AuthEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEngine")
            .field("config", &self.config)
            .field("has_token_sink", &self.token_sink.is_some())
            .finish_non_exhaustive()
    }
}

fn stage_failed(message: &str, err: KsefError) -> KsefError {
    warn!(stage = message, error = %err, "authentication request failed");
    KsefError::protocol_caused_by(message, err)
}

fn expect_object<'a>(response: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    response
        .as_object()
        .ok_or_else(|| KsefError::protocol(format!("{context} response is invalid")))
}

fn error_field(response: &Map<String, Value>) -> Option<String> {
    match response.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

fn required_text(value: Option<&Value>, message: &str) -> Result<String> {
    optional_text(value).ok_or_else(|| KsefError::protocol(message))
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// `timestampMs` wins over `timestamp`; missing or `null` counts as absent.
fn challenge_timestamp_ms(response: &Map<String, Value>) -> Result<i64> {
    let raw = ["timestampMs", "timestamp"]
        .iter()
        .find_map(|key| response.get(*key).filter(|value| !value.is_null()))
        .ok_or_else(|| KsefError::protocol("Challenge response missing timestamp"))?;

    parse_timestamp_ms(raw)
        .ok_or_else(|| KsefError::protocol(format!("Invalid challenge timestamp: {raw}")))
}

fn parse_timestamp_ms(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                return text.parse().ok();
            }
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.timestamp_millis());
            }
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc().timestamp_millis())
        }
        _ => None,
    }
}
