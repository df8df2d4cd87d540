//! cslens HTTP listener
//!
//! Accepts telemetry uploads the way a collector would and answers each one
//! with the decoded records as a JSON array. Useful for pointing a client at
//! a local endpoint and watching what it sends.
//!
//! # Endpoints
//!
//! - `POST /OneCollector/{*path}` - Decode the body, reply `200` with JSON
//! - `GET /health` - Health check
//!
//! ```text
//! POST /OneCollector/1.0
//! Content-Type: application/bond-compact-binary
//! Content-Encoding: gzip
//! Client-Id: NO_AUTH
//!
//! <compact binary records>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cslens_server::DecoderServer;
//! use tokio_util::sync::CancellationToken;
//!
//! let server = DecoderServer::new(config.server, config.decoder.to_options());
//! server.run(CancellationToken::new()).await?;
//! ```

mod error;
mod handlers;
mod metrics;
mod response;


use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use cslens_config::ServerConfig;
use cslens_protocol::{DecoderOptions, PayloadDecoder};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::ServerError;
pub use metrics::{MetricsSnapshot, ServerMetrics};
pub use response::ErrorResponse;

use handlers::{HandlerState, decode_payload, health_check};

/// HTTP listener that decodes every upload it receives
pub struct DecoderServer {
    config: ServerConfig,
    decoder: Arc<PayloadDecoder>,
    metrics: Arc<ServerMetrics>,
}

impl DecoderServer {
    /// Create a new listener
    pub fn new(config: ServerConfig, options: DecoderOptions) -> Self {
        Self {
            config,
            decoder: Arc::new(PayloadDecoder::new(options)),
            metrics: Arc::new(ServerMetrics::new()),
        }
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &ServerMetrics {
        &self.metrics
    }

    /// Run the listener
    ///
    /// Binds to the configured address and serves until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ServerError> {
        let bind_addr = self.config.socket_addr();

        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| ServerError::Bind {
                address: bind_addr.to_string(),
                source: e,
            })?;

        tracing::info!(
            address = %bind_addr,
            path_prefix = %self.config.path_prefix,
            "decoder listening"
        );

        let state = Arc::new(HandlerState {
            decoder: Arc::clone(&self.decoder),
            metrics: Arc::clone(&self.metrics),
            max_payload_size: self.config.max_payload_size,
        });
        let app = build_router(state, &self.config.path_prefix);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel))
            .await
            .map_err(|e| ServerError::Http(e.to_string()));

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            requests = snapshot.requests_received,
            records = snapshot.records_decoded,
            corrupt = snapshot.corrupt_payloads,
            "decoder stopped"
        );

        result
    }
}

/// Build the axum router
fn build_router(state: Arc<HandlerState>, path_prefix: &str) -> Router {
    let decode_route = format!("{}/{{*path}}", path_prefix.trim_end_matches('/'));

    Router::new()
        .route(&decode_route, post(decode_payload))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Shutdown signal future
async fn shutdown_signal(cancel: CancellationToken) {
    cancel.cancelled().await;
    tracing::info!("shutdown signal received");
}
