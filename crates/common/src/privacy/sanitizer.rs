//! Secret redaction for HTTP headers and bodies
//!
//! Every function here is pure and idempotent: sanitizing already sanitized
//! output returns it unchanged.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Replacement for redacted values
pub const REDACTED_VALUE: &str = "[REDACTED]";

const REDACTED_BEARER_VALUE: &str = "Bearer [REDACTED]";

static SENSITIVE_HEADER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(authorization|cookie|set-cookie|api[-_]?key|token|secret|password)")
        .expect("SENSITIVE_HEADER_KEY should compile - this is a bug")
});

static SENSITIVE_BODY_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(token|password|secret|authorization|cookie|api[-_]?key)")
        .expect("SENSITIVE_BODY_KEY should compile - this is a bug")
});

static BEARER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Bearer\s+").expect("BEARER_PREFIX should compile - this is a bug")
});

static BEARER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)Bearer\s+[^\s,;"]+"#).expect("BEARER_TOKEN should compile - this is a bug")
});

static KEY_VALUE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)((?:token|password|secret|api[-_]?key|authorization|cookie)\s*[=:]\s*)[^\s,;]+",
    )
    .expect("KEY_VALUE_PAIR should compile - this is a bug")
});

static QUOTED_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)("?(?:token|password|secret|api[-_]?key|authorization|cookie)"?\s*:\s*")([^"]+)(")"#,
    )
    .expect("QUOTED_PAIR should compile - this is a bug")
});

/// Redact header values.
///
/// Bearer credentials keep their scheme, headers with sensitive names are
/// replaced whole, everything else goes through [`sanitize_text`].
pub fn sanitize_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(key, value)| (key.clone(), sanitize_header_value(key, value)))
        .collect()
}

/// Redact a request or response body. Empty input yields `None`.
///
/// JSON documents are redacted structurally and re-serialized compactly;
/// anything else (including malformed JSON) is treated as text.
pub fn sanitize_body(body: Option<&str>) -> Option<String> {
    let content = body.filter(|b| !b.is_empty())?;

    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(json) = serde_json::from_str::<Value>(content) {
            return Some(redact_json(json).to_string());
        }
    }

    Some(sanitize_text(content))
}

/// Redact bearer tokens and `key=value` / `"key": "value"` fragments whose
/// key looks sensitive.
pub fn sanitize_text(text: &str) -> String {
    let redacted = BEARER_TOKEN.replace_all(text, REDACTED_BEARER_VALUE);
    let redacted = KEY_VALUE_PAIR.replace_all(&redacted, format!("${{1}}{REDACTED_VALUE}"));
    QUOTED_PAIR
        .replace_all(&redacted, format!("${{1}}{REDACTED_VALUE}${{3}}"))
        .into_owned()
}

fn sanitize_header_value(key: &str, value: &str) -> String {
    if BEARER_PREFIX.is_match(value) {
        return REDACTED_BEARER_VALUE.to_string();
    }
    if SENSITIVE_HEADER_KEY.is_match(key) {
        return REDACTED_VALUE.to_string();
    }
    sanitize_text(value)
}

fn redact_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, nested)| {
                    let redacted = if !SENSITIVE_BODY_KEY.is_match(&key) {
                        redact_json(nested)
                    } else if nested.is_object() || nested.is_array() {
                        redact_json(nested)
                    } else {
                        Value::String(REDACTED_VALUE.to_string())
                    };
                    (key, redacted)
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_json).collect()),
        Value::String(text) => Value::String(sanitize_text(&text)),
        other => other,
    }
}
