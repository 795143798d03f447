//! Ingest rejection errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Reason an ingest request was rejected before reaching the broadcaster.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported Media Type: expected application/json or temperature header")]
    UnsupportedMediaType,
    #[error("Empty body and no temperature header")]
    EmptyBody,
    #[error("Bad JSON: {0}")]
    BadJson(String),
    #[error("Expected a JSON object")]
    NotAnObject,
    #[error("Missing \"temperature\" field")]
    MissingField,
    #[error("Invalid temperature header: expected visible ASCII")]
    InvalidHeader,
    #[error("Body is not valid UTF-8")]
    InvalidUtf8,
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
