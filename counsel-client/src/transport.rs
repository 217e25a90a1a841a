//! The transport seam between the conversation and the network.

use crate::error::ClientResult;
use crate::types::{DocumentUpload, StreamRequest};
use async_trait::async_trait;
use bytes::Bytes;
use counsel_core::{DocItem, DocumentContent, NetworkError};
use futures::Stream;
use std::pin::Pin;

/// A streamed response body. Dropping it releases the connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, NetworkError>> + Send>>;

/// Opens answer streams.
///
/// Implementations fail with [`ClientError::Network`](crate::ClientError::Network)
/// when the server is unreachable and [`ClientError::Http`](crate::ClientError::Http)
/// when it rejects the request before streaming. They never retry.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Send `request` and return its body as a byte stream.
    async fn open_stream(&self, request: &StreamRequest) -> ClientResult<ByteStream>;
}

#[async_trait]
impl<T: StreamTransport + ?Sized> StreamTransport for std::sync::Arc<T> {
    async fn open_stream(&self, request: &StreamRequest) -> ClientResult<ByteStream> {
        (**self).open_stream(request).await
    }
}

/// Document library operations.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// List uploaded documents.
    async fn list_documents(&self) -> ClientResult<Vec<DocItem>>;

    /// Upload a document and return its ID.
    async fn upload_document(&self, upload: DocumentUpload) -> ClientResult<String>;

    /// Fetch a document's text. `None` when the server has no viewable text.
    async fn get_document(&self, id: &str) -> ClientResult<Option<DocumentContent>>;

    /// Delete a document.
    async fn delete_document(&self, id: &str) -> ClientResult<()>;
}
