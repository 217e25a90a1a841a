//! Error types for counsel.
//!
//! The taxonomy follows the life of a streamed answer: caller-side
//! precondition failures never reach the server, network and HTTP failures
//! happen before streaming starts, decode failures are per-frame, and stream
//! errors are signalled by the server mid-answer.

use crate::mode::ChatMode;
use std::fmt;
use thiserror::Error;

/// The main error type for counsel operations.
#[derive(Error, Debug)]
pub enum CounselError {
    /// The request never reached the server or the connection dropped.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The server rejected the request before streaming began.
    #[error("HTTP error: status {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// A single frame could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The server signalled an error event, or the stream failed mid-answer.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A caller-side precondition was not met; nothing was sent.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The API answered `success: false`.
    #[error("API error: {0}")]
    Api(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CounselError {
    /// Whether a caller could reasonably retry the same request.
    ///
    /// Nothing in counsel retries automatically; this only informs callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the error is a caller-side precondition failure.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

/// Result type alias using CounselError.
pub type Result<T> = std::result::Result<T, CounselError>;

/// Connection-level failure (DNS, refused, timeout, dropped body).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    /// Error message.
    pub message: String,
    /// Whether this is a timeout.
    pub is_timeout: bool,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_timeout {
            write!(f, "Request timeout: {}", self.message)
        } else {
            write!(f, "Network error: {}", self.message)
        }
    }
}

impl NetworkError {
    /// Create a new network error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_timeout: false,
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_timeout: true,
        }
    }
}

/// Caller-side rejection of a send. Its `Display` is the user-facing notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// The question was empty after trimming.
    #[error("Enter a question first.")]
    EmptyInput,

    /// Another answer is still streaming.
    #[error("Please wait for the current answer to finish.")]
    StreamInProgress,

    /// The mode needs more (or fewer) selected documents.
    #[error("{}", .mode.selection_notice())]
    InsufficientSelection {
        /// The active mode.
        mode: ChatMode,
        /// Documents the mode requires.
        required: usize,
        /// Documents currently selected.
        selected: usize,
    },
}

impl PreconditionError {
    /// Check a selection count against a mode's rule.
    pub fn check_selection(mode: ChatMode, selected: usize) -> std::result::Result<(), Self> {
        let rule = mode.selection_rule();
        if rule.is_satisfied_by(selected) {
            Ok(())
        } else {
            Err(Self::InsufficientSelection {
                mode,
                required: rule.required(),
                selected,
            })
        }
    }
}
