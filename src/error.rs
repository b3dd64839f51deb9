//! Error types for the RPC client

use thiserror::Error;

/// Transmission client error
#[derive(Debug, Error)]
pub enum TransmissionError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local .torrent file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed method name or argument shape (caller bug, never retried)
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Session-id negotiation failed
    #[error("Session error: {0}")]
    Session(String),

    /// Daemon rejected the configured credentials (HTTP 401)
    #[error("Authentication failed: invalid username/password")]
    Authentication,

    /// Daemon answered with an unexpected HTTP status
    #[error("Unexpected HTTP status {0} from daemon")]
    Protocol(u16),

    /// Daemon reported an error in the response envelope
    #[error("Daemon error: {0}")]
    Daemon(String),
}

/// Result type for RPC operations
pub type Result<T> = std::result::Result<T, TransmissionError>;
