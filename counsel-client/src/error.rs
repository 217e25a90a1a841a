//! Client error types.

use counsel_core::{CounselError, NetworkError};
use counsel_streaming::StreamError;
use thiserror::Error;

/// Errors returned by the counsel API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never reached the server, or the connection dropped.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Non-success HTTP status before any body was read.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The server answered `success: false`.
    #[error("API error: {message}")]
    Api {
        /// Error message.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The answer stream failed after it started.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Reading a local file for upload failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// HTTP status, if the server rejected the request.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Classify a reqwest failure as a network error.
pub(crate) fn network_error(err: &reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::timeout(err.to_string())
    } else {
        NetworkError::new(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ClientError::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ClientError::Configuration(err.to_string())
        } else {
            ClientError::Network(network_error(&err))
        }
    }
}

impl From<ClientError> for CounselError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(e) => CounselError::Network(e),
            ClientError::Http { status, .. } => CounselError::Http { status },
            ClientError::Api { message } => CounselError::Api(message),
            ClientError::InvalidResponse(msg) => CounselError::Decode(msg),
            ClientError::Stream(e) => e.into(),
            ClientError::Io(e) => CounselError::Configuration(e.to_string()),
            ClientError::Serialization(e) => CounselError::Serialization(e),
            ClientError::Configuration(msg) => CounselError::Configuration(msg),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::http(502, "Bad gateway");
        assert_eq!(err.to_string(), "HTTP error: 502 - Bad gateway");
        assert_eq!(err.status(), Some(502));

        let err = ClientError::api("Upload failed");
        assert_eq!(err.to_string(), "API error: Upload failed");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_into_counsel_error() {
        let err: CounselError = ClientError::http(500, "oops").into();
        assert!(matches!(err, CounselError::Http { status: 500 }));
        assert!(err.is_retryable());

        let err: CounselError = ClientError::from(NetworkError::new("refused")).into();
        assert!(matches!(err, CounselError::Network(_)));

        let err: CounselError = ClientError::from(StreamError::Server("x".into())).into();
        assert!(matches!(err, CounselError::Stream(_)));
    }
}
