//! Error types for backend API calls.

use thiserror::Error;

/// Errors surfaced by every client call.
///
/// Nothing here is recovered locally: a failed call hands one of these
/// straight back to the caller.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Network error calling {url}: {message}")]
    Network { url: String, message: String },

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status code carried by a `Status` error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request did not complete within its binding's timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_only_for_status_errors() {
        let err = ClientError::Status { status: 500, body: "boom".into() };
        assert_eq!(err.status_code(), Some(500));
        assert!(!err.is_timeout());

        let err = ClientError::Timeout { url: "http://x/api".into() };
        assert_eq!(err.status_code(), None);
        assert!(err.is_timeout());
    }

    #[test]
    fn test_display_includes_status_and_body() {
        let err = ClientError::Status { status: 404, body: "not here".into() };
        assert_eq!(err.to_string(), "Backend returned 404: not here");
    }
}
