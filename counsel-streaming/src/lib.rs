//! # counsel-streaming
//!
//! Streaming support for counsel answers.
//!
//! Answers arrive as Server-Sent Events. This crate turns the raw byte
//! stream into typed events and routes them to a handler:
//!
//! - **[`LineFramer`]**: splits chunked bytes into complete lines
//! - **[`StreamEvent`]**: decodes one `data: ` payload
//! - **[`Dispatcher`]**: delivers events to a [`StreamHandler`] until `done`/`error`
//! - **[`EventStream`]** / **[`consume`]**: the whole pipeline over a byte stream
//!
//! ## Example
//!
//! ```ignore
//! use counsel_streaming::{consume, StreamCallbacks};
//!
//! let mut answer = String::new();
//! let outcome = consume(
//!     byte_stream,
//!     StreamCallbacks::new()
//!         .on_metadata(|meta| println!("Sources: {:?}", meta.sources()))
//!         .on_content(|fragment| answer.push_str(&fragment))
//!         .on_error(|message| eprintln!("Error: {message}")),
//! )
//! .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod dispatch;
pub mod error;
pub mod events;
pub mod framer;
pub mod sse;

// Re-exports
pub use dispatch::{Dispatch, Dispatcher, StreamCallbacks, StreamHandler, StreamOutcome};
pub use error::{StreamError, StreamResult};
pub use events::StreamEvent;
pub use framer::{data_payload, LineFramer, DEFAULT_MAX_LINE_BYTES};
pub use sse::{consume, consume_with_framer, EventStream};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        consume, EventStream, StreamCallbacks, StreamError, StreamEvent, StreamHandler,
        StreamOutcome, StreamResult,
    };
}
