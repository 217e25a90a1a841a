//! Chat message types.

use super::metadata::Metadata;
use crate::identifier::{now_utc, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person asking.
    User,
    /// The legal assistant.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// Lifecycle of a message's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Content is still arriving.
    Streaming,
    /// Content is final.
    #[default]
    Complete,
    /// The message reports a failed attempt and is rendered as an error.
    Error,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: MessageId,
    /// Author.
    pub role: Role,
    /// Text content. Append-only while streaming.
    pub content: String,
    /// Metadata from the stream's `metadata` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Sources to display under the answer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Content lifecycle.
    #[serde(default)]
    pub status: MessageStatus,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            metadata: None,
            sources: Vec::new(),
            timestamp: now_utc(),
            status,
        }
    }

    /// A finished user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, MessageStatus::Complete)
    }

    /// An empty assistant message that will receive streamed content.
    #[must_use]
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), MessageStatus::Streaming)
    }

    /// A finished assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, MessageStatus::Complete)
    }

    /// An assistant-visible error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Role::Assistant, message, MessageStatus::Error)
    }

    /// Attach metadata and derive the source list from it.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.set_metadata(metadata);
        self
    }

    /// Replace metadata and recompute sources.
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.sources = metadata.sources();
        self.metadata = Some(metadata);
    }

    /// Merge metadata (last write wins) and recompute sources.
    pub fn merge_metadata(&mut self, metadata: Metadata) {
        match self.metadata.as_mut() {
            Some(existing) => {
                existing.merge(metadata);
                self.sources = existing.sources();
            }
            None => self.set_metadata(metadata),
        }
    }

    /// Whether the message is from the user.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Whether content may still be appended.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.status == MessageStatus::Streaming
    }

    /// Whether this message reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == MessageStatus::Error
    }
}
