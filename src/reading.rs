//! Reading normalization.
//!
//! Turns one ingest request into the single [`Message`] that is fanned out
//! to subscribers. Two modes exist: JSON, where the payload is re-serialized
//! as `{"temperature":<value>}`, and text, where the payload is the raw text.

use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use crate::error::IngestError;

/// Header that carries a reading directly, bypassing the body.
pub const TEMPERATURE_HEADER: &str = "temperature";

/// Field that must be present in a JSON body.
pub const TEMPERATURE_FIELD: &str = "temperature";

/// One reading event, shared by every subscriber it is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(Arc<str>);

impl Message {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Message {
    fn from(payload: &str) -> Self {
        Self(Arc::from(payload))
    }
}

impl From<String> for Message {
    fn from(payload: String) -> Self {
        Self(Arc::from(payload))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepted ingest encoding and matching stream payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Header or JSON body; payload `{"temperature":<value>}`
    #[default]
    Json,
    /// Header or raw text body; payload is the text itself
    Text,
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestMode::Json => write!(f, "json"),
            IngestMode::Text => write!(f, "text"),
        }
    }
}

/// Normalize one ingest request into a message.
///
/// The `temperature` header wins over the body when present.
pub fn normalize(mode: IngestMode, headers: &HeaderMap, body: &[u8]) -> Result<Message, IngestError> {
    if let Some(value) = headers.get(TEMPERATURE_HEADER) {
        let value = value.to_str().map_err(|_| IngestError::InvalidHeader)?;
        return Ok(from_header(mode, value));
    }

    match mode {
        IngestMode::Json => {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            from_json_body(content_type, body)
        }
        IngestMode::Text => from_text_body(body),
    }
}

fn from_header(mode: IngestMode, value: &str) -> Message {
    match mode {
        IngestMode::Json => temperature_payload(Value::String(value.to_owned())),
        IngestMode::Text => Message::from(value),
    }
}

fn from_json_body(content_type: Option<&str>, body: &[u8]) -> Result<Message, IngestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptyBody);
    }

    if !is_json_content_type(content_type) {
        return Err(IngestError::UnsupportedMediaType);
    }

    let parsed: Value =
        serde_json::from_slice(body).map_err(|e| IngestError::BadJson(e.to_string()))?;

    let Value::Object(mut fields) = parsed else {
        return Err(IngestError::NotAnObject);
    };

    let temperature = fields
        .remove(TEMPERATURE_FIELD)
        .ok_or(IngestError::MissingField)?;

    Ok(temperature_payload(temperature))
}

fn from_text_body(body: &[u8]) -> Result<Message, IngestError> {
    let text = std::str::from_utf8(body).map_err(|_| IngestError::InvalidUtf8)?;
    let text = text.trim_end_matches(['\r', '\n']);

    if text.is_empty() {
        return Err(IngestError::EmptyBody);
    }

    // Bare carriage returns are not allowed inside SSE data.
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    Ok(Message::from(text))
}

/// Media type check: any `Content-Type` whose essence mentions `json`.
fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

fn temperature_payload(value: Value) -> Message {
    let mut object = serde_json::Map::with_capacity(1);
    object.insert(TEMPERATURE_FIELD.to_owned(), value);
    Message::from(Value::Object(object).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_json_body_is_reserialized_compactly() {
        let message = normalize(IngestMode::Json, &json_headers(), br#"{ "temperature" : 21.5 }"#).unwrap();

        assert_eq!(message.as_str(), r#"{"temperature":21.5}"#);
    }

    #[test]
    fn test_json_body_extra_fields_are_discarded() {
        let body = br#"{"temperature": -3, "unit": "C"}"#;
        let message = normalize(IngestMode::Json, &json_headers(), body).unwrap();

        assert_eq!(message.as_str(), r#"{"temperature":-3}"#);
    }

    #[test]
    fn test_header_bypasses_body() {
        let mut headers = HeaderMap::new();
        headers.insert(TEMPERATURE_HEADER, HeaderValue::from_static("19.9"));

        let message = normalize(IngestMode::Json, &headers, b"not json at all").unwrap();

        assert_eq!(message.as_str(), r#"{"temperature":"19.9"}"#);
    }

    #[test]
    fn test_header_in_text_mode_is_raw() {
        let mut headers = HeaderMap::new();
        headers.insert(TEMPERATURE_HEADER, HeaderValue::from_static("19.9"));

        let message = normalize(IngestMode::Text, &headers, b"").unwrap();

        assert_eq!(message.as_str(), "19.9");
    }

    #[test]
    fn test_non_visible_header_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TEMPERATURE_HEADER, HeaderValue::from_bytes(b"\xff").unwrap());

        let err = normalize(IngestMode::Json, &headers, b"").unwrap_err();

        assert!(matches!(err, IngestError::InvalidHeader));
    }

    #[test]
    fn test_missing_content_type_rejected() {
        let err = normalize(IngestMode::Json, &HeaderMap::new(), br#"{"temperature":1}"#).unwrap_err();

        assert!(matches!(err, IngestError::UnsupportedMediaType));
    }

    #[test]
    fn test_json_content_type_variants() {
        assert!(is_json_content_type(Some("application/json")));
        assert!(is_json_content_type(Some("application/json; charset=utf-8")));
        assert!(is_json_content_type(Some("application/vnd.api+JSON")));
        assert!(!is_json_content_type(Some("text/plain")));
        assert!(!is_json_content_type(Some("text/plain; note=json")));
        assert!(!is_json_content_type(None));
    }

    #[test]
    fn test_empty_body_without_content_type_is_empty_not_unsupported() {
        let err = normalize(IngestMode::Json, &HeaderMap::new(), b"").unwrap_err();

        assert!(matches!(err, IngestError::EmptyBody));
    }

    #[test]
    fn test_empty_json_body_rejected() {
        let err = normalize(IngestMode::Json, &json_headers(), b"  \n").unwrap_err();

        assert!(matches!(err, IngestError::EmptyBody));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = normalize(IngestMode::Json, &json_headers(), b"{\"temperature\":").unwrap_err();

        assert!(matches!(err, IngestError::BadJson(_)));
        assert!(err.to_string().starts_with("Bad JSON: "));
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = normalize(IngestMode::Json, &json_headers(), b"{}").unwrap_err();

        assert!(matches!(err, IngestError::MissingField));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = normalize(IngestMode::Json, &json_headers(), b"[21.5]").unwrap_err();

        assert!(matches!(err, IngestError::NotAnObject));
    }

    #[test]
    fn test_text_body_trims_trailing_line_breaks() {
        let message = normalize(IngestMode::Text, &HeaderMap::new(), b"22.1\r\n\n").unwrap();

        assert_eq!(message.as_str(), "22.1");
    }

    #[test]
    fn test_text_body_normalizes_inner_carriage_returns() {
        let message = normalize(IngestMode::Text, &HeaderMap::new(), b"a\r\nb\rc").unwrap();

        assert_eq!(message.as_str(), "a\nb\nc");
    }

    #[test]
    fn test_text_body_ignores_content_type() {
        let message = normalize(IngestMode::Text, &json_headers(), b"{\"x\":1}").unwrap();

        assert_eq!(message.as_str(), "{\"x\":1}");
    }

    #[test]
    fn test_empty_text_body_rejected() {
        let err = normalize(IngestMode::Text, &HeaderMap::new(), b"\r\n").unwrap_err();

        assert!(matches!(err, IngestError::EmptyBody));
    }

    #[test]
    fn test_whitespace_text_body_kept() {
        let message = normalize(IngestMode::Text, &HeaderMap::new(), b"   \n").unwrap();

        assert_eq!(message.as_str(), "   ");
    }

    #[test]
    fn test_tab_text_body_kept() {
        let message = normalize(IngestMode::Text, &HeaderMap::new(), b"\t\r\n").unwrap();

        assert_eq!(message.as_str(), "\t");
    }

    #[test]
    fn test_invalid_utf8_text_rejected() {
        let err = normalize(IngestMode::Text, &HeaderMap::new(), b"\xff\xfe").unwrap_err();

        assert!(matches!(err, IngestError::InvalidUtf8));
    }
}
