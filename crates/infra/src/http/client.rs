use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ksef_common::privacy::{sanitize_body, sanitize_headers, sanitize_text};
use ksef_common::time::{Clock, Sleeper, SystemClock, ThreadSleeper};
use ksef_core::{ApiLogSink, KsefApi, SettingsProvider, TokenSink};
use ksef_domain::constants::{CONTENT_TYPE_JSON, CONTENT_TYPE_XML};
use ksef_domain::{
    ApiLogEntry, Bearer, ClientSettings, Headers, HttpMethod, Result, TokenPair, TransportError,
    XmlResponse,
};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use super::response::{json_payload, xml_payload};
use super::transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};

/// Resilient KSeF API client.
///
/// Retries 5xx responses and retryable transport failures with exponential
/// backoff, returns HTTP failures as annotated payloads and records one
/// sanitized audit entry per logical call.
///
/// A single instance is not meant to be driven from several threads at once.
pub struct KsefClient {
    base_url: String,
    settings: ClientSettings,
    transport: Arc<dyn HttpTransport>,
    log_sink: Option<Arc<dyn ApiLogSink>>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    access_token: RwLock<Option<String>>,
}

impl KsefClient {
    /// Start building a client from the given settings.
    pub fn builder(settings: ClientSettings) -> KsefClientBuilder {
        KsefClientBuilder::new(settings)
    }

    /// Client with the default transport, configured by `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`ksef_domain::KsefError::Config`] when the HTTP backend
    /// cannot be constructed.
    pub fn from_provider(provider: &dyn SettingsProvider) -> Result<Self> {
        Self::builder(provider.client_settings()).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Replace the token used for `Bearer::Default` calls.
    pub fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write() = Some(token.into());
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    pub fn clear_access_token(&self) {
        *self.access_token.write() = None;
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorization(&self, bearer: &Bearer) -> Option<String> {
        let token = match bearer {
            Bearer::Default => self.access_token.read().clone(),
            Bearer::Token(token) => Some(token.clone()),
            Bearer::None => None,
        };
        token.filter(|token| !token.trim().is_empty()).map(|token| format!("Bearer {token}"))
    }

    fn headers_for(&self, method: HttpMethod, accept: &str, bearer: &Bearer) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), accept.to_string());
        if method == HttpMethod::Post {
            headers.insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
        }
        if let Some(value) = self.authorization(bearer) {
            headers.insert("Authorization".to_string(), value);
        }
        headers
    }

    /// Run one logical call: retries, timing and the audit entry.
    fn perform(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        accept: &str,
        bearer: &Bearer,
    ) -> Result<TransportResponse> {
        let body = match method {
            HttpMethod::Post => Some(body.map_or_else(|| "{}".to_string(), Value::to_string)),
            HttpMethod::Get => None,
        };
        let request = TransportRequest {
            method,
            url: self.url_for(path),
            headers: self.headers_for(method, accept, bearer),
            body,
        };

        let timestamp = self.clock.utc_now();
        let started = self.clock.now();
        let outcome = self.send_with_retry(&request);
        let elapsed = self.clock.now().saturating_duration_since(started);

        self.record(timestamp, path, &request, &outcome, elapsed);
        outcome.map_err(Into::into)
    }

    fn send_with_retry(
        &self,
        request: &TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let max_retries = self.settings.max_retries;
        let mut attempt: u32 = 0;

        loop {
            debug!(
                attempt = attempt + 1,
                method = %request.method,
                url = %request.url,
                "sending KSeF request"
            );

            match self.transport.execute(request) {
                Ok(response) => {
                    debug!(
                        attempt = attempt + 1,
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        "received KSeF response"
                    );

                    if response.is_server_error() && attempt < max_retries {
                        let delay = self.backoff_delay(attempt);
                        warn!(
                            attempt = attempt + 1,
                            status = response.status,
                            delay_ms = duration_ms(delay),
                            url = %request.url,
                            "server error, retrying"
                        );
                        self.sleeper.sleep(delay);
                        attempt += 1;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    if err.is_retryable() && attempt < max_retries {
                        let delay = self.backoff_delay(attempt);
                        warn!(
                            attempt = attempt + 1,
                            kind = %err.kind,
                            delay_ms = duration_ms(delay),
                            url = %request.url,
                            error = %err,
                            "transport failure, retrying"
                        );
                        self.sleeper.sleep(delay);
                        attempt += 1;
                        continue;
                    }

                    debug!(
                        attempt = attempt + 1,
                        url = %request.url,
                        error = %err,
                        "KSeF request failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Delay before the retry that follows failed attempt `attempt` (0-based).
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt);
        self.settings.backoff_base().saturating_mul(multiplier)
    }

    fn record(
        &self,
        timestamp: DateTime<Utc>,
        path: &str,
        request: &TransportRequest,
        outcome: &std::result::Result<TransportResponse, TransportError>,
        elapsed: Duration,
    ) {
        let Some(sink) = &self.log_sink else {
            return;
        };

        let (status, response_headers, response_body, error) = match outcome {
            Ok(response) => {
                let error = response.is_server_error().then(|| format!("HTTP {}", response.status));
                (
                    response.status,
                    sanitize_headers(&response.headers),
                    sanitize_body(Some(&response.body)),
                    error,
                )
            }
            Err(err) => {
                let message = sanitize_text(&err.to_string());
                (0, Headers::new(), Some(message.clone()), Some(message))
            }
        };

        sink.record(ApiLogEntry {
            timestamp,
            method: request.method,
            path: path.to_string(),
            status,
            duration_ms: duration_ms(elapsed),
            request_headers: sanitize_headers(&request.headers),
            request_body: sanitize_body(request.body.as_deref()),
            response_headers,
            response_body,
            error,
        });
    }
}

impl KsefApi for KsefClient {
    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        bearer: Bearer,
    ) -> Result<Value> {
        let response = self.perform(method, path, body, CONTENT_TYPE_JSON, &bearer)?;
        Ok(json_payload(&response))
    }

    fn request_xml(&self, path: &str, bearer: Bearer) -> Result<XmlResponse> {
        let response = self.perform(HttpMethod::Get, path, None, CONTENT_TYPE_XML, &bearer)?;
        Ok(xml_payload(&response))
    }
}

impl TokenSink for KsefClient {
    fn store_tokens(&self, tokens: &TokenPair) {
        self.set_access_token(tokens.access_token.clone());
    }
}

impl std::fmt::Debug for KsefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KsefClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.settings.max_retries)
            .field("has_access_token", &self.access_token.read().is_some())
            .finish_non_exhaustive()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Builder for [`KsefClient`].
pub struct KsefClientBuilder {
    settings: ClientSettings,
    transport: Option<Arc<dyn HttpTransport>>,
    log_sink: Option<Arc<dyn ApiLogSink>>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    access_token: Option<String>,
}

impl KsefClientBuilder {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            transport: None,
            log_sink: None,
            sleeper: Arc::new(ThreadSleeper),
            clock: Arc::new(SystemClock),
            access_token: None,
        }
    }

    /// Use a custom transport instead of the blocking `reqwest` one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn ApiLogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Finalize the client.
    ///
    /// # Errors
    ///
    /// Returns [`ksef_domain::KsefError::Config`] when the default transport
    /// cannot be constructed.
    pub fn build(self) -> Result<KsefClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.settings.timeouts)?),
        };

        Ok(KsefClient {
            base_url: self.settings.base_url(),
            settings: self.settings,
            transport,
            log_sink: self.log_sink,
            sleeper: self.sleeper,
            clock: self.clock,
            access_token: RwLock::new(self.access_token),
        })
    }
}
