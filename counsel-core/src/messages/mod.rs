//! Message types for legal-assistant conversations.
//!
//! - [`ChatMessage`]: one user question or assistant answer
//! - [`Metadata`]: open key/value payload the server sends with an answer

mod chat;
mod metadata;

pub use chat::{ChatMessage, MessageStatus, Role};
pub use metadata::Metadata;
