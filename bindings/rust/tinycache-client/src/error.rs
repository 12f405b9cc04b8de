//! Error types for the tinycache client.

use thiserror::Error;

/// Errors that can occur when using the tinycache client.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured server URL could not be used
    #[error("Invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP transport error (connection refused, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the request (bad parameters, malformed pattern, ...)
    #[error("Server rejected {op} ({status}): {message}")]
    Server {
        status: u16,
        op: String,
        message: String,
    },

    /// The response body was not what the operation expects
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the server answered with a client error for this request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Error::Server { status, .. } if (400..500).contains(status))
    }
}
