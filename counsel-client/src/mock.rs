//! Scripted transport for testing.
//!
//! [`MockTransport`] answers stream requests from a queue of pre-configured
//! replies and serves a small in-memory document library.
//!
//! ```rust
//! use counsel_client::MockTransport;
//!
//! let transport = MockTransport::new()
//!     .with_frames([
//!         r#"{"type":"content","content":"Hello"}"#,
//!         r#"{"type":"done"}"#,
//!     ])
//!     .with_http_error(500);
//! ```

use crate::error::{ClientError, ClientResult};
use crate::transport::{ByteStream, DocumentApi, StreamTransport};
use crate::types::{DocumentUpload, StreamRequest};
use async_trait::async_trait;
use bytes::Bytes;
use counsel_core::{DocItem, DocumentContent, NetworkError};
use futures::stream::{self, Stream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One scripted reply to `open_stream`.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream these raw chunks, then end.
    Chunks(Vec<Bytes>),
    /// Stream these chunks, then fail with a network error.
    Abort(Vec<Bytes>),
    /// Stream these chunks, then stall without closing.
    Hang(Vec<Bytes>),
    /// Reject with this HTTP status before streaming.
    Http(u16),
    /// Fail to connect.
    Unreachable,
}

impl MockReply {
    /// One `data: ` frame per JSON payload.
    pub fn frames<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Chunks(
            payloads
                .into_iter()
                .map(|p| Bytes::from(format!("data: {}\n\n", p.as_ref())))
                .collect(),
        )
    }
}

#[derive(Debug, Default)]
struct Library {
    documents: Vec<DocItem>,
    next_id: usize,
    fail_list: bool,
    fail_upload: Option<String>,
    fail_delete: bool,
}

/// A transport that replays scripted replies.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<StreamRequest>>>,
    library: Arc<Mutex<Library>>,
}

impl MockTransport {
    /// Create a transport with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    #[must_use]
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Queue a reply of `data: ` frames.
    #[must_use]
    pub fn with_frames<I, S>(self, payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.with_reply(MockReply::frames(payloads))
    }

    /// Queue an HTTP rejection.
    #[must_use]
    pub fn with_http_error(self, status: u16) -> Self {
        self.with_reply(MockReply::Http(status))
    }

    /// Seed the document library.
    #[must_use]
    pub fn with_documents(self, documents: impl IntoIterator<Item = DocItem>) -> Self {
        self.library.lock().documents.extend(documents);
        self
    }

    /// Queue a reply on a shared handle.
    pub fn push_reply(&self, reply: MockReply) {
        self.replies.lock().push_back(reply);
    }

    /// Make `list_documents` fail.
    pub fn fail_list(&self, fail: bool) {
        self.library.lock().fail_list = fail;
    }

    /// Make the next uploads fail with this server message.
    pub fn fail_upload(&self, message: Option<&str>) {
        self.library.lock().fail_upload = message.map(str::to_string);
    }

    /// Make `delete_document` fail.
    pub fn fail_delete(&self, fail: bool) {
        self.library.lock().fail_delete = fail;
    }

    /// Stream requests received so far.
    pub fn requests(&self) -> Vec<StreamRequest> {
        self.requests.lock().clone()
    }

    /// The most recent stream request.
    pub fn last_request(&self) -> Option<StreamRequest> {
        self.requests.lock().last().cloned()
    }

    /// Documents currently stored.
    pub fn documents(&self) -> Vec<DocItem> {
        self.library.lock().documents.clone()
    }
}

fn chunk_stream(chunks: Vec<Bytes>) -> impl Stream<Item = Result<Bytes, NetworkError>> + Send {
    stream::iter(chunks.into_iter().map(Ok))
}

#[async_trait]
impl StreamTransport for MockTransport {
    async fn open_stream(&self, request: &StreamRequest) -> ClientResult<ByteStream> {
        self.requests.lock().push(request.clone());

        let reply = self.replies.lock().pop_front().unwrap_or(MockReply::Chunks(Vec::new()));
        let body: ByteStream = match reply {
            MockReply::Chunks(chunks) => Box::pin(chunk_stream(chunks)),
            MockReply::Abort(chunks) => Box::pin(
                chunk_stream(chunks)
                    .chain(stream::once(async { Err(NetworkError::new("connection reset")) })),
            ),
            MockReply::Hang(chunks) => Box::pin(chunk_stream(chunks).chain(stream::pending())),
            MockReply::Http(status) => return Err(ClientError::http(status, "")),
            MockReply::Unreachable => {
                return Err(ClientError::Network(NetworkError::new("connection refused")))
            }
        };

        Ok(body)
    }
}

#[async_trait]
impl DocumentApi for MockTransport {
    async fn list_documents(&self) -> ClientResult<Vec<DocItem>> {
        let library = self.library.lock();
        if library.fail_list {
            return Err(ClientError::api("Failed to fetch documents"));
        }
        Ok(library.documents.clone())
    }

    async fn upload_document(&self, upload: DocumentUpload) -> ClientResult<String> {
        let mut library = self.library.lock();
        if let Some(message) = &library.fail_upload {
            return Err(ClientError::api(message.clone()));
        }
        library.next_id += 1;
        let id = format!("doc-{}", library.next_id);
        let preview = String::from_utf8_lossy(&upload.bytes).into_owned();
        library.documents.push(
            DocItem::new(&id, upload.filename, "2026-01-01")
                .with_file_size(upload.bytes.len() as u64)
                .with_preview(preview),
        );
        Ok(id)
    }

    async fn get_document(&self, id: &str) -> ClientResult<Option<DocumentContent>> {
        let library = self.library.lock();
        Ok(library.documents.iter().find(|d| d.id == id).map(|d| DocumentContent {
            id: d.id.clone(),
            filename: d.filename.clone(),
            content: d.preview.clone().unwrap_or_default(),
        }))
    }

    async fn delete_document(&self, id: &str) -> ClientResult<()> {
        let mut library = self.library.lock();
        if library.fail_delete {
            return Err(ClientError::api("Delete failed"));
        }
        library.documents.retain(|d| d.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewContractRequest;

    fn review(id: &str) -> StreamRequest {
        StreamRequest::ReviewContract(ReviewContractRequest {
            document_id: id.into(),
        })
    }

    #[tokio::test]
    async fn test_replies_in_order() {
        let transport = MockTransport::new()
            .with_frames([r#"{"type":"done"}"#])
            .with_http_error(503);

        let mut body = transport.open_stream(&review("a")).await.unwrap();
        let chunk = body.next().await.unwrap().unwrap();
        assert_eq!(chunk, Bytes::from("data: {\"type\":\"done\"}\n\n"));
        assert!(body.next().await.is_none());

        let err = transport.open_stream(&review("b")).await.err().unwrap();
        assert_eq!(err.status(), Some(503));

        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.last_request(), Some(review("b")));
    }

    #[tokio::test]
    async fn test_abort_ends_with_network_error() {
        let transport = MockTransport::new()
            .with_reply(MockReply::Abort(vec![Bytes::from_static(b"data: {}\n")]));

        let items: Vec<_> = transport
            .open_stream(&review("a"))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_library() {
        let transport = MockTransport::new().with_documents([DocItem::new("d0", "old.pdf", "2025")]);

        let id = transport
            .upload_document(DocumentUpload::new("lease.txt", &b"THIS LEASE"[..]))
            .await
            .unwrap();
        assert_eq!(id, "doc-1");
        assert_eq!(transport.list_documents().await.unwrap().len(), 2);

        let content = transport.get_document(&id).await.unwrap().unwrap();
        assert_eq!(content.content, "THIS LEASE");

        transport.delete_document("d0").await.unwrap();
        assert_eq!(transport.documents().len(), 1);

        transport.fail_delete(true);
        assert!(transport.delete_document(&id).await.is_err());
        transport.fail_upload(Some("Unsupported file type"));
        assert!(transport
            .upload_document(DocumentUpload::new("x.png", &b""[..]))
            .await
            .is_err());
    }
}
