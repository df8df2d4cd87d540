//! HTTP route handlers
//!
//! # Endpoints
//!
//! - `POST {prefix}/{*path}` - Decode a compact binary payload, reply with JSON
//! - `GET /health` - Health check

use std::sync::Arc;

use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use cslens_protocol::{PayloadDecoder, RawInput};

use crate::metrics::ServerMetrics;
use crate::response::{decode_error_response, error_response, json_response};

/// Shared state for handlers
pub struct HandlerState {
    pub decoder: Arc<PayloadDecoder>,
    pub metrics: Arc<ServerMetrics>,
    pub max_payload_size: usize,
}

/// POST {prefix}/{*path} - Decode the body and echo it back as JSON
pub async fn decode_payload(
    State(state): State<Arc<HandlerState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    state.metrics.request_received();

    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if let Some(size) = declared.filter(|size| *size > state.max_payload_size) {
        return payload_too_large(
            &state,
            format!("payload size {size} exceeds limit {}", state.max_payload_size),
        );
    }

    // Chunked or undeclared bodies are cut off at the limit while buffering
    let body = match to_bytes(body, state.max_payload_size).await {
        Ok(body) => body,
        Err(e) => {
            return payload_too_large(
                &state,
                format!("payload exceeds limit {}: {e}", state.max_payload_size),
            );
        }
    };
    state.metrics.bytes_received(body.len());

    let input = RawInput::from_headers(
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?))),
        body,
    );

    // Inflating and walking a large payload is CPU-bound
    let decoder = Arc::clone(&state.decoder);
    let decoded = tokio::task::spawn_blocking(move || {
        let result = decoder.decode(&input);
        (input.client_id, result)
    })
    .await;

    let (client_id, result) = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            state.metrics.server_error();
            tracing::error!(error = %e, "decode task failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "decode task failed",
            );
        }
    };
    let client_id = client_id.as_deref().unwrap_or("-");

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            state.metrics.client_error();
            tracing::warn!(client_id, error = %e, "payload rejected");
            return decode_error_response(&e);
        }
    };

    if let Some(e) = output.stop.error() {
        state.metrics.corrupt_payload();
        tracing::warn!(
            client_id,
            records = output.records.len(),
            error = %e,
            "payload has a corrupt tail"
        );
    }

    state.metrics.request_success(output.records.len());
    json_response(output.combined)
}

fn payload_too_large(state: &HandlerState, message: String) -> Response {
    state.metrics.client_error();
    error_response(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", message)
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
