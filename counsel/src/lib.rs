//! # counsel - streaming legal-assistant client
//!
//! Client for a document-grounded legal-assistant API: upload contracts and
//! other documents, ask questions about them, compare them, ask general law
//! questions, and review contracts. Answers stream back over Server-Sent
//! Events and are applied incrementally to a conversation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use counsel::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ChatSession::from_client(CounselClient::from_env()?);
//!     session.set_mode(ChatMode::Law);
//!     session.ask("What are tenant rights when a lease ends early?").await?;
//!
//!     if let Some(answer) = session.conversation().last_message() {
//!         println!("{}", answer.content);
//!         println!("Sources: {:?}", answer.sources);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`counsel_core`] - messages, documents, modes, and errors
//! - [`counsel_streaming`] - SSE framing, event decoding, and dispatch
//! - [`counsel_client`] - the HTTP transport and typed API
//! - [`counsel_chat`] - the conversation state machine and chat session
//!
//! ## Streaming without a session
//!
//! ```rust,no_run
//! use counsel::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let client = CounselClient::new(ClientConfig::new())?;
//! let mut answer = String::new();
//! let outcome = client
//!     .ask_question(
//!         vec!["doc-1".to_string()],
//!         "What are the termination clauses?",
//!         StreamCallbacks::new().on_content(|fragment| answer.push_str(&fragment)),
//!     )
//!     .await?;
//! assert!(outcome.is_completed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use counsel_chat as chat;
pub use counsel_client as client;
pub use counsel_core as core;
pub use counsel_streaming as streaming;

// Core
pub use counsel_core::{
    ChatMessage, ChatMode, ConversationId, CounselError, DocItem, DocumentContent, MessageId,
    MessageStatus, Metadata, NetworkError, PreconditionError, Result, Role, SelectionRule,
};

// Streaming
pub use counsel_streaming::{
    consume, Dispatcher, EventStream, LineFramer, StreamCallbacks, StreamError, StreamEvent,
    StreamHandler, StreamOutcome,
};

// Client
pub use counsel_client::{
    ClientConfig, ClientError, CounselClient, DocumentApi, DocumentUpload, MockTransport,
    StreamRequest, StreamTransport,
};

// Chat
pub use counsel_chat::{
    ChatAction, ChatError, ChatSession, ChatState, Conversation, DocumentLibrary, Notification,
    NotificationKind, Notifier, RecordingNotifier, TracingNotifier, TurnOutcome,
};

/// Convenient prelude for common imports.
///
/// ```rust
/// use counsel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ChatMessage, ChatMode, ChatSession, ClientConfig, ClientError, Conversation,
        CounselClient, CounselError, DocumentUpload, Metadata, Notification, Notifier,
        StreamCallbacks, StreamEvent, StreamHandler, StreamOutcome, TracingNotifier,
    };
}
