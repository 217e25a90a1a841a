//! Streaming errors.

use counsel_core::{CounselError, NetworkError};
use thiserror::Error;

/// Errors that can occur while consuming an answer stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A single frame could not be decoded. Never fatal to the stream.
    #[error("Failed to parse SSE data: {0}")]
    Decode(String),

    /// The server sent a line longer than the framer accepts.
    #[error("SSE line exceeds {limit} bytes")]
    LineTooLong {
        /// Configured maximum line length.
        limit: usize,
    },

    /// The byte source failed mid-stream.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The server signalled an `error` event.
    #[error("Server error: {0}")]
    Server(String),
}

impl StreamError {
    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether the stream can keep going after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<StreamError> for CounselError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Decode(msg) => CounselError::Decode(msg),
            StreamError::Network(e) => CounselError::Network(e),
            StreamError::Server(msg) => CounselError::Stream(msg),
            other @ StreamError::LineTooLong { .. } => CounselError::Stream(other.to_string()),
        }
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::LineTooLong { limit: 16 };
        assert_eq!(err.to_string(), "SSE line exceeds 16 bytes");
        assert_eq!(
            StreamError::decode("expected value").to_string(),
            "Failed to parse SSE data: expected value"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(StreamError::decode("bad").is_recoverable());
        assert!(!StreamError::Server("boom".into()).is_recoverable());
        assert!(!StreamError::LineTooLong { limit: 1 }.is_recoverable());
    }

    #[test]
    fn test_into_counsel_error() {
        let err: CounselError = StreamError::Server("quota exceeded".into()).into();
        assert!(matches!(err, CounselError::Stream(ref m) if m == "quota exceeded"));

        let err: CounselError = StreamError::Network(NetworkError::new("reset")).into();
        assert!(err.is_retryable());
    }
}
