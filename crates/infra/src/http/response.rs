//! Turning raw responses into annotated payloads

use ksef_domain::XmlResponse;
use serde_json::{json, Map, Value};

use super::transport::TransportResponse;

/// Build the JSON payload for one response.
///
/// Non-2xx payloads always carry `http_status` and `error`.
pub fn json_payload(response: &TransportResponse) -> Value {
    let status = response.status;
    let success = response.is_success();

    if response.body.trim().is_empty() {
        let payload = json!({ "error": format!("Empty response (HTTP {status})") });
        return annotate_failure(payload, status, success);
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) if success => value,
        Ok(Value::Object(map)) => merge_status(map, status),
        Ok(other) => {
            let mut map = Map::new();
            map.insert("body".to_string(), other);
            merge_status(map, status)
        }
        Err(_) => annotate_failure(
            json!({
                "error": format!("Invalid JSON response (HTTP {status})"),
                "body": response.body,
            }),
            status,
            success,
        ),
    }
}

/// Build the XML outcome: the raw document on a non-empty 2xx body.
pub fn xml_payload(response: &TransportResponse) -> XmlResponse {
    if response.is_success() && !response.body.trim().is_empty() {
        return XmlResponse::Document(response.body.clone());
    }
    XmlResponse::Failure(json_payload(response))
}

fn annotate_failure(payload: Value, status: u16, success: bool) -> Value {
    match payload {
        Value::Object(mut map) if !success => {
            map.insert("http_status".to_string(), Value::from(status));
            Value::Object(map)
        }
        other => other,
    }
}

fn merge_status(mut map: Map<String, Value>, status: u16) -> Value {
    map.insert("http_status".to_string(), Value::from(status));
    let has_error = map.get("error").is_some_and(|error| !error.is_null());
    if !has_error {
        map.insert("error".to_string(), Value::String(format!("HTTP {status}")));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksef_domain::Headers;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse { status, headers: Headers::new(), body: body.to_string() }
    }

    #[test]
    fn success_json_is_returned_untouched() {
        let payload = json_payload(&response(200, r#"{"a":1}"#));
        assert_eq!(payload, json!({"a": 1}));
    }

    #[test]
    fn empty_success_body_reports_error_without_status() {
        let payload = json_payload(&response(204, ""));
        assert_eq!(payload, json!({"error": "Empty response (HTTP 204)"}));
    }

    #[test]
    fn invalid_json_keeps_raw_body() {
        let payload = json_payload(&response(200, "<html>"));
        assert_eq!(payload["error"], "Invalid JSON response (HTTP 200)");
        assert_eq!(payload["body"], "<html>");
        assert!(payload.get("http_status").is_none());
    }

    #[test]
    fn invalid_json_on_failure_carries_status() {
        let payload = json_payload(&response(502, "Bad Gateway"));
        assert_eq!(payload["http_status"], 502);
        assert_eq!(payload["error"], "Invalid JSON response (HTTP 502)");
    }

    #[test]
    fn server_error_message_is_kept() {
        let payload = json_payload(&response(400, r#"{"error":"bad nip"}"#));
        assert_eq!(payload, json!({"error": "bad nip", "http_status": 400}));
    }

    #[test]
    fn missing_error_defaults_to_status_text() {
        let payload = json_payload(&response(404, r#"{"detail":"nope"}"#));
        assert_eq!(payload["error"], "HTTP 404");
        assert_eq!(payload["detail"], "nope");
    }

    #[test]
    fn non_object_failure_is_wrapped() {
        let payload = json_payload(&response(500, "[1,2]"));
        assert_eq!(payload["body"], json!([1, 2]));
        assert_eq!(payload["http_status"], 500);
        assert_eq!(payload["error"], "HTTP 500");
    }

    #[test]
    fn xml_document_on_success() {
        let outcome = xml_payload(&response(200, "<Faktura/>"));
        assert_eq!(outcome, XmlResponse::Document("<Faktura/>".to_string()));
    }

    #[test]
    fn xml_failure_uses_json_rules() {
        let outcome = xml_payload(&response(404, r#"{"error":"not found"}"#));
        match outcome {
            XmlResponse::Failure(payload) => {
                assert_eq!(payload["error"], "not found");
                assert_eq!(payload["http_status"], 404);
            }
            XmlResponse::Document(doc) => panic!("unexpected document {doc}"),
        }
    }
}
