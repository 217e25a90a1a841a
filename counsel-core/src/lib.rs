//! # counsel-core
//!
//! Core types, messages, and error handling for the counsel legal-assistant client.
//!
//! This crate provides the foundational types used throughout the counsel workspace:
//!
//! - **Messages**: chat messages and the open metadata attached to answers
//! - **Documents**: library items and viewable document text
//! - **Modes**: chat sub-modes and their document-selection preconditions
//! - **Errors**: the error taxonomy shared by transport, streaming, and chat
//! - **Identifiers**: type-safe IDs for messages and conversations
//!
//! ## Example
//!
//! ```rust
//! use counsel_core::{ChatMessage, ChatMode, Metadata, PreconditionError};
//!
//! let answer = ChatMessage::assistant_placeholder()
//!     .with_metadata(Metadata::new().with("sources_referenced", vec!["Art. 18"]));
//! assert_eq!(answer.sources, vec!["Art. 18".to_string()]);
//!
//! assert!(PreconditionError::check_selection(ChatMode::Compare, 1).is_err());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod documents;
pub mod errors;
pub mod identifier;
pub mod messages;
pub mod mode;

// Re-exports for convenience
pub use documents::{DocItem, DocumentContent};
pub use errors::{CounselError, NetworkError, PreconditionError, Result};
pub use identifier::{now_utc, ConversationId, MessageId};
pub use messages::{ChatMessage, MessageStatus, Metadata, Role};
pub use mode::{ChatMode, SelectionRule};
