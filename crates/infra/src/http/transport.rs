//! Single-attempt HTTP transport

use ksef_domain::{
    Headers, HttpMethod, KsefError, Result, Timeouts, TransportError, TransportErrorKind,
};
use reqwest::blocking::Client as BlockingClient;
use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::errors::IntoTransportError;

/// Fully built request for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

/// Raw response of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Executes exactly one attempt; retry policy lives in the client
pub trait HttpTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no complete response was received.
    fn execute(
        &self,
        request: &TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Blocking `reqwest` transport with per-attempt timeouts
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: BlockingClient,
}

impl ReqwestTransport {
    /// Build a transport bounded by `timeouts`.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`KsefError::Config`] when the TLS backend cannot be set up.
    pub fn new(timeouts: &Timeouts) -> Result<Self> {
        let client = BlockingClient::builder()
            .connect_timeout(timeouts.connect())
            .timeout(timeouts.request())
            .build()
            .map_err(|err| KsefError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: &TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(IntoTransportError::into_transport)?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.text().map_err(|err| {
            TransportError::new(TransportErrorKind::Body, err.into_transport().message)
        })?;

        Ok(TransportResponse { status, headers, body })
    }
}

/// Flatten response headers; repeated names are joined with `, `.
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name.as_str().to_string())
            .and_modify(|joined: &mut String| {
                joined.push_str(", ");
                joined.push_str(&value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}
