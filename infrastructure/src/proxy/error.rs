//! Error types for the completion proxy

use thiserror::Error;

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors raised while serving a proxied completion
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("No upstream API key configured")]
    MissingApiKey,

    #[error("Malformed HTTP request: {0}")]
    MalformedRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
