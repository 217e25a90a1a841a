//! # counsel-client
//!
//! HTTP transport for the counsel legal-assistant API.
//!
//! [`CounselClient`] talks to the backend over `reqwest`: it lists, uploads,
//! views, and deletes documents, and opens the four streaming answer
//! endpoints. Conversation code depends on the [`StreamTransport`] and
//! [`DocumentApi`] traits instead, so tests can swap in [`MockTransport`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use counsel_client::{ClientConfig, CounselClient};
//! use counsel_streaming::StreamCallbacks;
//!
//! # async fn run() -> counsel_client::ClientResult<()> {
//! let client = CounselClient::new(ClientConfig::from_env()?)?;
//! let outcome = client
//!     .ask_law_question(
//!         "What is the legal marriage age?",
//!         Some("nepal".to_string()),
//!         None,
//!         StreamCallbacks::new().on_content(|c| print!("{c}")),
//!     )
//!     .await?;
//! println!("\n{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod transport;
pub mod types;

pub use client::CounselClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use mock::{MockReply, MockTransport};
pub use transport::{ByteStream, DocumentApi, StreamTransport};
pub use types::{
    AskLawQuestionRequest, AskQuestionRequest, CompareDocumentsRequest, DocumentUpload,
    ReviewContractRequest, StreamRequest,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientError, ClientResult, CounselClient, DocumentApi, StreamRequest,
        StreamTransport,
    };
}
