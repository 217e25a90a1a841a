//! Conversation lifecycle states.

use serde::{Deserialize, Serialize};

/// Where a conversation is in the life of one answer.
///
/// ```text
/// Idle ── send ──▶ Sending ── metadata/content ──▶ StreamingContent ── done ──▶ Idle
///                     │                                   │
///                     └──────────── error/failed ─────────┴──▶ Idle
/// ```
///
/// A failed answer also returns to `Idle`; the failure is kept as the
/// conversation's last [`TurnOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    /// No answer in flight.
    #[default]
    Idle,
    /// Request accepted; no event has arrived yet.
    Sending,
    /// The assistant message is receiving content.
    StreamingContent,
}

impl ChatState {
    /// Whether an answer is in flight.
    #[must_use]
    pub fn is_streaming(self) -> bool {
        matches!(self, Self::Sending | Self::StreamingContent)
    }

    /// Whether a new send may start.
    #[must_use]
    pub fn accepts_send(self) -> bool {
        !self.is_streaming()
    }
}

/// How the most recent answer ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The server sent `done`.
    Answered,
    /// The server sent an `error` event.
    ServerError(String),
    /// The request or stream failed on our side.
    Failed(String),
}

impl TurnOutcome {
    /// The failure message, if the answer failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Answered => None,
            Self::ServerError(m) | Self::Failed(m) => Some(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_states() {
        assert!(!ChatState::Idle.is_streaming());
        assert!(ChatState::Sending.is_streaming());
        assert!(ChatState::StreamingContent.is_streaming());
        assert!(ChatState::Idle.accepts_send());
        assert!(!ChatState::StreamingContent.accepts_send());
    }

    #[test]
    fn test_outcome_message() {
        assert_eq!(TurnOutcome::Answered.error_message(), None);
        assert_eq!(TurnOutcome::Failed("Request failed".into()).error_message(), Some("Request failed"));
    }
}
