//! Chat session errors.

use counsel_client::ClientError;
use counsel_core::{CounselError, PreconditionError};
use counsel_streaming::StreamError;
use thiserror::Error;

/// Errors returned by [`ChatSession`](crate::ChatSession).
///
/// By the time one of these is returned the conversation has already been
/// updated and the user notified.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The send was rejected before anything was sent.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The request failed before or outside streaming.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The answer stream failed after it started.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl ChatError {
    /// Whether the send was rejected locally.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl From<ChatError> for CounselError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Precondition(e) => CounselError::Precondition(e),
            ChatError::Client(e) => e.into(),
            ChatError::Stream(e) => e.into(),
        }
    }
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
