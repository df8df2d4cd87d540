//! HTTP response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use cslens_protocol::DecodeError;
use serde::Serialize;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Create error response
pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(error, message))).into_response()
}

/// Status and error code for a payload the decoder refused
///
/// Record-level errors never escape `PayloadDecoder::decode`; they end up
/// in `DecodeOutput::stop` instead.
pub fn decode_error_status(err: &DecodeError) -> (StatusCode, &'static str) {
    match err {
        DecodeError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
        DecodeError::UnsupportedEncoding(_) => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_encoding")
        }
        DecodeError::DecompressionFailure { .. } => (StatusCode::BAD_REQUEST, "decompression_failed"),
        DecodeError::TruncatedRecord { .. } | DecodeError::MalformedField { .. } => {
            (StatusCode::BAD_REQUEST, "malformed_payload")
        }
    }
}

/// Create error response from a decode error
pub fn decode_error_response(err: &DecodeError) -> Response {
    let (status, code) = decode_error_status(err);
    error_response(status, code, err.to_string())
}

/// 200 response carrying the combined JSON array
pub fn json_response(body: String) -> Response {
    (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response()
}
