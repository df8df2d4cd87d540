//! Server error types

/// Listener errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Hyper/HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}
