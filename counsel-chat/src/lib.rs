//! # counsel-chat
//!
//! Conversation state and the chat session for counsel.
//!
//! - [`Conversation`]: the ordered message list, changed only by
//!   [`Conversation::apply`] with a [`ChatAction`]
//! - [`ChatSession`]: sends questions over a transport, streams answers into
//!   the conversation, and manages the [`DocumentLibrary`]
//! - [`Notifier`]: where user-facing notices go
//!
//! ## Example
//!
//! ```rust,no_run
//! use counsel_chat::ChatSession;
//! use counsel_client::CounselClient;
//! use counsel_core::ChatMode;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ChatSession::from_client(CounselClient::from_env()?);
//! session.refresh_documents().await?;
//! session.set_mode(ChatMode::Law);
//!
//! session.ask("What is the legal marriage age?").await?;
//! for message in session.conversation().messages() {
//!     println!("{}: {}", message.role, message.content);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod conversation;
pub mod error;
pub mod library;
pub mod notify;
pub mod session;
pub mod state;

pub use conversation::{ChatAction, Conversation, Transition};
pub use error::{ChatError, ChatResult};
pub use library::DocumentLibrary;
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{ChatSession, REQUEST_CANCELLED, REQUEST_FAILED};
pub use state::{ChatState, TurnOutcome};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ChatAction, ChatError, ChatResult, ChatSession, Conversation, DocumentLibrary,
        Notification, Notifier,
    };
}
