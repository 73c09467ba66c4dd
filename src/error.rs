//! Error types for the shrewtrace library
//!
//! Every fallible library operation returns [`Result`]. An empty trace is not
//! an error and never shows up here; see [`crate::trace::TraceOutcome`].

use thiserror::Error;

/// Errors raised by the shrewtrace client
#[derive(Debug, Error)]
pub enum ShrewError {
    /// The server answered with a JSON-RPC `error` object
    #[error("RPC error: {message}{}", .code.map(|c| format!(" (code: {c})")).unwrap_or_default())]
    Remote {
        /// Server-supplied message, verbatim
        message: String,
        /// Server-supplied code, if any
        code: Option<i64>,
    },

    /// The HTTP exchange itself failed
    #[error("transport error: {message}{}", .status.map(|s| format!(" (status: {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status code, when a response was received
        status: Option<u16>,
        /// Response body, when one could be read
        body: Option<String>,
        /// What failed, from reqwest or the request that got the bad status
        message: String,
    },

    /// The body was not a JSON-RPC response, or a batch came back misshapen
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid outpoint: {0}")]
    InvalidOutpoint(String),

    #[error("hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShrewError {
    /// Build a remote error from a message and optional code
    pub fn remote(message: impl Into<String>, code: Option<i64>) -> Self {
        ShrewError::Remote {
            message: message.into(),
            code,
        }
    }

    /// True when the server rejected the call, as opposed to the call not
    /// reaching the server
    pub fn is_remote(&self) -> bool {
        matches!(self, ShrewError::Remote { .. })
    }
}

impl From<reqwest::Error> for ShrewError {
    fn from(err: reqwest::Error) -> Self {
        ShrewError::Transport {
            status: err.status().map(|s| s.as_u16()),
            body: None,
            message: err.to_string(),
        }
    }
}

/// Result type for shrewtrace operations
pub type Result<T> = std::result::Result<T, ShrewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = ShrewError::remote("unknown view function", Some(-32000));
        assert_eq!(err.to_string(), "RPC error: unknown view function (code: -32000)");

        let err = ShrewError::remote("bad outpoint", None);
        assert_eq!(err.to_string(), "RPC error: bad outpoint");
        assert!(err.is_remote());
    }

    #[test]
    fn test_transport_error_display() {
        let err = ShrewError::Transport {
            status: Some(502),
            body: Some("Bad Gateway".to_string()),
            message: "RPC request failed".to_string(),
        };
        assert_eq!(err.to_string(), "transport error: RPC request failed (status: 502)");
        assert!(!err.is_remote());
    }
}
