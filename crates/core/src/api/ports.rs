//! Port interfaces for the KSeF API client
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use ksef_domain::{
    ApiLogEntry, AuthConfig, Bearer, ClientSettings, HttpMethod, Result, TokenPair, XmlResponse,
};
use serde_json::Value;

/// Resilient request/response access to the KSeF API
///
/// Implementations return HTTP failures (4xx, exhausted 5xx) as annotated
/// payloads and only raise for transport or construction errors.
pub trait KsefApi: Send + Sync {
    /// Issue one logical JSON call (retries included).
    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        bearer: Bearer,
    ) -> Result<Value>;

    /// Issue one logical GET call accepting `application/xml`.
    fn request_xml(&self, path: &str, bearer: Bearer) -> Result<XmlResponse>;

    fn get(&self, path: &str, bearer: Bearer) -> Result<Value> {
        self.request(HttpMethod::Get, path, None, bearer)
    }

    fn post(&self, path: &str, body: Option<&Value>, bearer: Bearer) -> Result<Value> {
        self.request(HttpMethod::Post, path, body, bearer)
    }

    fn get_xml(&self, path: &str) -> Result<XmlResponse> {
        self.request_xml(path, Bearer::Default)
    }
}

/// Receiver of freshly issued tokens
pub trait TokenSink: Send + Sync {
    fn store_tokens(&self, tokens: &TokenPair);
}

/// Trait for persisting or forwarding audit entries
pub trait ApiLogSink: Send + Sync {
    /// Accept one entry; must not fail the calling request.
    fn record(&self, entry: ApiLogEntry);
}

/// Source of network and polling settings
pub trait SettingsProvider: Send + Sync {
    fn client_settings(&self) -> ClientSettings;

    fn auth_config(&self) -> AuthConfig {
        AuthConfig::default()
    }
}

impl SettingsProvider for ClientSettings {
    fn client_settings(&self) -> ClientSettings {
        self.clone()
    }
}
