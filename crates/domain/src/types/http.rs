//! HTTP request vocabulary shared between ports and adapters

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header map with deterministic ordering for audit output
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization choice for a single call
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Bearer {
    /// Use the client's stored access token, if any
    #[default]
    Default,
    /// Use this explicit token
    Token(String),
    /// Send no Authorization header
    None,
}

impl Bearer {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }
}

impl fmt::Debug for Bearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Bearer::Default"),
            Self::Token(_) => f.write_str("Bearer::Token([REDACTED])"),
            Self::None => f.write_str("Bearer::None"),
        }
    }
}

/// Outcome of an XML-accepting request
#[derive(Debug, Clone, PartialEq)]
pub enum XmlResponse {
    /// Raw document text of a non-empty 2xx response
    Document(String),
    /// Annotated failure payload (same shape as JSON calls)
    Failure(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_debug_hides_token() {
        assert_eq!(format!("{:?}", Bearer::token("abc")), "Bearer::Token([REDACTED])");
        assert_eq!(Bearer::default(), Bearer::Default);
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(serde_json::to_value(HttpMethod::Post).unwrap(), "POST");
    }
}
