//! The chat session driver.
//!
//! [`ChatSession`] ties one [`Conversation`] to a transport: it validates
//! and sends the current input, streams the answer into the conversation,
//! and manages the document library around it. Every user-visible outcome
//! goes through the session's [`Notifier`].

use crate::conversation::{ChatAction, Conversation, Transition};
use crate::error::{ChatError, ChatResult};
use crate::library::DocumentLibrary;
use crate::notify::{Notification, Notifier, TracingNotifier};
use counsel_client::{ClientError, CounselClient, DocumentApi, DocumentUpload, StreamTransport};
use counsel_core::documents::NO_CONTENT_PLACEHOLDER;
use counsel_core::{ChatMode, DocumentContent};
use counsel_streaming::{
    consume_with_framer, LineFramer, StreamHandler, StreamOutcome, DEFAULT_MAX_LINE_BYTES,
};

/// Shown when a request or stream fails on the client side.
pub const REQUEST_FAILED: &str = "Request failed";
/// Shown when an in-flight answer is abandoned.
pub const REQUEST_CANCELLED: &str = "Request cancelled";

/// Feeds stream events into a conversation, collecting its notices.
struct ConversationHandler<'a> {
    conversation: &'a mut Conversation,
    notifications: Vec<Notification>,
}

impl ConversationHandler<'_> {
    fn apply(&mut self, action: ChatAction) {
        let transition = self.conversation.apply(action);
        self.notifications.extend(transition.notifications);
    }
}

impl StreamHandler for ConversationHandler<'_> {
    fn on_metadata(&mut self, metadata: counsel_core::Metadata) {
        self.apply(ChatAction::Metadata(metadata));
    }

    fn on_content(&mut self, fragment: String) {
        self.apply(ChatAction::Content(fragment));
    }

    fn on_done(&mut self) {
        self.apply(ChatAction::Done);
    }

    fn on_error(&mut self, message: String) {
        self.apply(ChatAction::Error(message));
    }
}

/// A conversation, its document library, and the transport behind them.
#[derive(Debug)]
pub struct ChatSession<T, N = TracingNotifier> {
    transport: T,
    notifier: N,
    conversation: Conversation,
    library: DocumentLibrary,
    mode: ChatMode,
    input: String,
    max_line_bytes: usize,
}

impl<T> ChatSession<T, TracingNotifier>
where
    T: StreamTransport + DocumentApi,
{
    /// Create a session that logs its notices.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            notifier: TracingNotifier,
            conversation: Conversation::new(),
            library: DocumentLibrary::new(),
            mode: ChatMode::default(),
            input: String::new(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ChatSession<CounselClient, TracingNotifier> {
    /// Create a session over an HTTP client, taking law defaults and the SSE
    /// line cap from its configuration.
    pub fn from_client(client: CounselClient) -> Self {
        let config = client.config();
        let conversation = Conversation::new()
            .with_jurisdiction(config.default_jurisdiction.clone())
            .with_top_k(config.default_top_k);
        let max_line_bytes = config.max_line_bytes;

        Self::new(client)
            .with_conversation(conversation)
            .with_max_line_bytes(max_line_bytes)
    }
}

impl<T, N> ChatSession<T, N>
where
    T: StreamTransport + DocumentApi,
    N: Notifier,
{
    /// Replace the notifier.
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> ChatSession<T, M> {
        ChatSession {
            transport: self.transport,
            notifier,
            conversation: self.conversation,
            library: self.library,
            mode: self.mode,
            input: self.input,
            max_line_bytes: self.max_line_bytes,
        }
    }

    /// Replace the conversation.
    #[must_use]
    pub fn with_conversation(mut self, conversation: Conversation) -> Self {
        self.conversation = conversation;
        self
    }

    /// Set the SSE line cap.
    #[must_use]
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    /// The conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The document library.
    pub fn library(&self) -> &DocumentLibrary {
        &self.library
    }

    /// Mutable access to the library, for selection changes.
    pub fn library_mut(&mut self) -> &mut DocumentLibrary {
        &mut self.library
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The active mode.
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Switch modes. The selection is kept.
    pub fn set_mode(&mut self, mode: ChatMode) {
        self.mode = mode;
    }

    /// The pending input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the pending input.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Whether an answer is in flight.
    pub fn is_streaming(&self) -> bool {
        self.conversation.is_streaming()
    }

    // ========================================================================
    // Chat
    // ========================================================================

    /// Set the input to `question` and send it.
    pub async fn ask(&mut self, question: impl Into<String>) -> ChatResult<StreamOutcome> {
        self.set_input(question);
        self.send().await
    }

    /// Send the pending input in the active mode and stream the answer.
    ///
    /// Rejected sends return [`ChatError::Precondition`] with the input kept.
    /// A failed request or stream is recorded in the conversation as an
    /// error message before the error is returned. A body that closes
    /// without `done` or `error` is treated as a failed request.
    pub async fn send(&mut self) -> ChatResult<StreamOutcome> {
        let action = ChatAction::send(self.input.clone(), self.mode, self.library.selection());
        let Transition {
            request,
            rejection,
            notifications,
        } = self.conversation.apply(action);
        self.forward(&notifications);

        if let Some(err) = rejection {
            return Err(err.into());
        }
        let Some(request) = request else {
            return Err(ChatError::Client(ClientError::InvalidResponse(
                "send produced no request".to_string(),
            )));
        };
        self.input.clear();

        let body = match self.transport.open_stream(&request).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, path = request.path(), "Request failed");
                self.apply(ChatAction::Failed(REQUEST_FAILED.to_string()));
                return Err(err.into());
            }
        };

        let framer = LineFramer::with_max_line_bytes(self.max_line_bytes);
        let mut handler = ConversationHandler {
            conversation: &mut self.conversation,
            notifications: Vec::new(),
        };
        let result = consume_with_framer(body, framer, &mut handler).await;
        let notifications = handler.notifications;
        self.forward(&notifications);

        match result {
            Ok(StreamOutcome::Ended) => {
                tracing::warn!(path = request.path(), "Answer stream closed without done");
                self.apply(ChatAction::Failed(REQUEST_FAILED.to_string()));
                Ok(StreamOutcome::Ended)
            }
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(error = %err, path = request.path(), "Answer stream failed");
                self.apply(ChatAction::Failed(REQUEST_FAILED.to_string()));
                Err(err.into())
            }
        }
    }

    /// Give up on an answer whose stream was dropped mid-flight.
    ///
    /// Returns whether an answer was in flight.
    pub fn abandon(&mut self) -> bool {
        if !self.is_streaming() {
            return false;
        }
        self.apply(ChatAction::Failed(REQUEST_CANCELLED.to_string()));
        true
    }

    fn apply(&mut self, action: ChatAction) {
        let transition = self.conversation.apply(action);
        self.forward(&transition.notifications);
    }

    fn forward(&self, notifications: &[Notification]) {
        for notification in notifications {
            self.notifier.notify(notification);
        }
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Reload the document list. Selected IDs that no longer exist are dropped.
    pub async fn refresh_documents(&mut self) -> ChatResult<()> {
        match self.transport.list_documents().await {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "Documents fetched");
                self.library.set_documents(documents);
                self.library.retain_known();
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(&Notification::error("Failed to fetch documents"));
                Err(err.into())
            }
        }
    }

    /// Upload a document and reload the list.
    ///
    /// With `auto_select` the new document goes to the front of the
    /// selection, and `Law` mode switches to `Ask` so the next question
    /// uses it.
    pub async fn upload(&mut self, upload: DocumentUpload, auto_select: bool) -> ChatResult<String> {
        let filename = upload.filename.clone();
        let id = match self.transport.upload_document(upload).await {
            Ok(id) => id,
            Err(err) => {
                let message = match &err {
                    ClientError::Api { message } => message.clone(),
                    _ => "Upload failed".to_string(),
                };
                self.notifier.notify(&Notification::error(message));
                return Err(err.into());
            }
        };

        self.notifier
            .notify(&Notification::success(format!("Uploaded: {filename}")));
        if let Err(err) = self.refresh_documents().await {
            tracing::debug!(error = %err, "Refresh after upload failed");
        }

        if auto_select {
            self.library.select_first(&id);
            if self.mode == ChatMode::Law {
                self.mode = ChatMode::Ask;
            }
        }
        Ok(id)
    }

    /// Delete a document and drop it from the selection.
    pub async fn delete_document(&mut self, id: &str) -> ChatResult<()> {
        if let Err(err) = self.transport.delete_document(id).await {
            self.notifier.notify(&Notification::error("Delete failed"));
            return Err(err.into());
        }

        self.notifier.notify(&Notification::success("Document deleted"));
        self.library.remove(id);
        if let Err(err) = self.refresh_documents().await {
            tracing::debug!(error = %err, "Refresh after delete failed");
        }
        Ok(())
    }

    /// Fetch a document's text for viewing.
    ///
    /// Falls back to the list item's preview when the server has no
    /// viewable text.
    pub async fn view_document(&self, id: &str) -> ChatResult<DocumentContent> {
        let item = self.library.get(id);
        match self.transport.get_document(id).await {
            Ok(Some(mut content)) => {
                if content.filename.is_empty() {
                    if let Some(item) = item {
                        content.filename = item.filename.clone();
                    }
                }
                Ok(content)
            }
            Ok(None) => Ok(item.map(DocumentContent::from_preview).unwrap_or_else(|| {
                DocumentContent {
                    id: id.to_string(),
                    filename: String::new(),
                    content: NO_CONTENT_PLACEHOLDER.to_string(),
                }
            })),
            Err(err) => {
                self.notifier.notify(&Notification::error("View failed"));
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::state::{ChatState, TurnOutcome};
    use bytes::Bytes;
    use counsel_client::types::{AskQuestionRequest, CompareDocumentsRequest};
    use counsel_client::{MockReply, MockTransport, StreamRequest};
    use counsel_core::{DocItem, MessageStatus};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn session(transport: &MockTransport) -> (ChatSession<MockTransport, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let session = ChatSession::new(transport.clone()).with_notifier(notifier.clone());
        (session, notifier)
    }

    fn library_docs() -> Vec<DocItem> {
        vec![
            DocItem::new("A", "lease.pdf", "2026-01-01").with_preview("THIS LEASE"),
            DocItem::new("B", "nda.pdf", "2026-01-02"),
        ]
    }

    #[tokio::test]
    async fn test_send_streams_answer() {
        let transport = MockTransport::new().with_documents(library_docs()).with_frames([
            r#"{"type":"metadata","documents_used":["A"]}"#,
            r#"{"type":"content","content":"Hello"}"#,
            r#"{"type":"content","content":" world"}"#,
            r#"{"type":"done"}"#,
        ]);
        let (mut session, notifier) = session(&transport);
        session.refresh_documents().await.unwrap();
        session.library_mut().select("A");

        let outcome = session.ask("  What is this?  ").await.unwrap();

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(session.input(), "");
        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "What is this?");
        assert_eq!(messages[1].content, "Hello world");
        assert_eq!(messages[1].sources, vec!["A".to_string()]);
        assert!(!session.is_streaming());
        assert!(notifier.notifications().is_empty());
        assert_eq!(
            transport.last_request(),
            Some(StreamRequest::AskQuestion(AskQuestionRequest {
                document_ids: vec!["A".into()],
                question: "What is this?".into(),
            }))
        );
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped() {
        let transport = MockTransport::new().with_frames([
            "{not json",
            r#"{"type":"content","content":"ok"}"#,
            r#"{"type":"done"}"#,
        ]);
        let (mut session, _) = session(&transport);
        session.set_mode(ChatMode::Law);

        session.ask("Q").await.unwrap();
        assert_eq!(session.conversation().last_message().unwrap().content, "ok");
        assert_eq!(session.conversation().error_count(), 0);
    }

    #[tokio::test]
    async fn test_nothing_dispatched_after_done() {
        let transport = MockTransport::new().with_reply(MockReply::Chunks(vec![Bytes::from(
            "data: {\"type\":\"content\",\"content\":\"A\"}\n\ndata: {\"type\":\"done\"}\n\ndata: {\"type\":\"content\",\"content\":\"B\"}\n\n",
        )]));
        let (mut session, _) = session(&transport);
        session.set_mode(ChatMode::Law);

        session.ask("Q").await.unwrap();
        assert_eq!(session.conversation().last_message().unwrap().content, "A");
    }

    #[tokio::test]
    async fn test_compare_with_one_document_sends_nothing() {
        let transport = MockTransport::new().with_documents(library_docs());
        let (mut session, notifier) = session(&transport);
        session.refresh_documents().await.unwrap();
        session.library_mut().select("A");
        session.set_mode(ChatMode::Compare);

        let err = session.ask("Differences?").await.unwrap_err();

        assert!(err.is_precondition());
        assert!(transport.requests().is_empty());
        assert!(session.conversation().messages().is_empty());
        assert_eq!(session.input(), "Differences?");
        assert_eq!(notifier.messages(), vec!["Select at least 2 documents to compare."]);
    }

    #[tokio::test]
    async fn test_compare_sends_question_as_criteria() {
        let transport = MockTransport::new()
            .with_documents(library_docs())
            .with_frames([r#"{"type":"done"}"#]);
        let (mut session, _) = session(&transport);
        session.refresh_documents().await.unwrap();
        session.library_mut().select("B");
        session.library_mut().select("A");
        session.set_mode(ChatMode::Compare);

        session.ask("Liability caps").await.unwrap();
        assert_eq!(
            transport.last_request(),
            Some(StreamRequest::CompareDocuments(CompareDocumentsRequest {
                document_ids: vec!["B".into(), "A".into()],
                comparison_criteria: Some("Liability caps".into()),
            }))
        );
    }

    #[tokio::test]
    async fn test_server_error_event() {
        let transport = MockTransport::new().with_frames([
            r#"{"type":"content","content":"Partial"}"#,
            r#"{"type":"error","message":"Model overloaded"}"#,
        ]);
        let (mut session, notifier) = session(&transport);
        session.set_mode(ChatMode::Law);

        let outcome = session.ask("Q").await.unwrap();

        assert_eq!(outcome, StreamOutcome::ServerError("Model overloaded".into()));
        assert!(!session.is_streaming());
        assert_eq!(session.conversation().error_count(), 1);
        assert_eq!(notifier.messages(), vec!["Model overloaded"]);
    }

    #[tokio::test]
    async fn test_http_error_records_request_failed() {
        let transport = MockTransport::new().with_http_error(500);
        let (mut session, notifier) = session(&transport);
        session.set_mode(ChatMode::Law);

        let err = session.ask("Q").await.unwrap_err();

        assert!(matches!(err, ChatError::Client(ClientError::Http { status: 500, .. })));
        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, REQUEST_FAILED);
        assert_eq!(messages[1].status, MessageStatus::Error);
        assert_eq!(notifier.messages(), vec![REQUEST_FAILED]);
        assert_eq!(session.conversation().state(), ChatState::Idle);
        assert!(session
            .conversation()
            .last_outcome()
            .is_some_and(|o| o.error_message() == Some(REQUEST_FAILED)));
    }

    #[tokio::test]
    async fn test_connection_drop_mid_stream() {
        let transport = MockTransport::new().with_reply(MockReply::Abort(vec![Bytes::from(
            "data: {\"type\":\"content\",\"content\":\"Half an\"}\n\n",
        )]));
        let (mut session, _) = session(&transport);
        session.set_mode(ChatMode::Law);

        let err = session.ask("Q").await.unwrap_err();

        assert!(matches!(err, ChatError::Stream(_)));
        let messages = session.conversation().messages();
        assert_eq!(messages[1].content, "Half an");
        assert_eq!(messages[1].status, MessageStatus::Complete);
        assert_eq!(messages[2].content, REQUEST_FAILED);
        assert_eq!(session.conversation().error_count(), 1);
    }

    #[tokio::test]
    async fn test_stream_closed_without_done() {
        let transport = MockTransport::new().with_frames([r#"{"type":"content","content":"cut"}"#]);
        let (mut session, _) = session(&transport);
        session.set_mode(ChatMode::Law);

        let outcome = session.ask("Q").await.unwrap();

        assert_eq!(outcome, StreamOutcome::Ended);
        assert!(!session.is_streaming());
        assert_eq!(
            session.conversation().last_outcome(),
            Some(&TurnOutcome::Failed(REQUEST_FAILED.into()))
        );
    }

    #[tokio::test]
    async fn test_abandon_after_dropped_send() {
        let transport = MockTransport::new().with_reply(MockReply::Hang(vec![Bytes::from(
            "data: {\"type\":\"content\",\"content\":\"Still thinking\"}\n\n",
        )]));
        let (mut session, notifier) = session(&transport);
        session.set_mode(ChatMode::Law);

        let pending = tokio::time::timeout(Duration::from_millis(50), session.ask("Q")).await;
        assert!(pending.is_err());
        assert!(session.is_streaming());

        assert!(session.abandon());
        assert!(!session.is_streaming());
        assert_eq!(session.conversation().last_message().unwrap().content, REQUEST_CANCELLED);
        assert_eq!(notifier.messages(), vec![REQUEST_CANCELLED]);
        assert!(!session.abandon());
    }

    #[tokio::test]
    async fn test_upload_auto_selects_and_leaves_law_mode() {
        let transport = MockTransport::new().with_documents(library_docs());
        let (mut session, notifier) = session(&transport);
        session.refresh_documents().await.unwrap();
        session.library_mut().select("B");
        session.set_mode(ChatMode::Law);

        let id = session
            .upload(DocumentUpload::new("msa.pdf", &b"MASTER SERVICES"[..]), true)
            .await
            .unwrap();

        assert_eq!(session.library().selected(), [id.as_str(), "B"]);
        assert_eq!(session.mode(), ChatMode::Ask);
        assert_eq!(session.library().documents().len(), 3);
        assert_eq!(notifier.messages(), vec!["Uploaded: msa.pdf"]);
    }

    #[tokio::test]
    async fn test_upload_without_auto_select() {
        let transport = MockTransport::new();
        let (mut session, _) = session(&transport);
        session.set_mode(ChatMode::Law);

        session
            .upload(DocumentUpload::new("msa.pdf", &b"MSA"[..]), false)
            .await
            .unwrap();
        assert!(session.library().selected().is_empty());
        assert_eq!(session.mode(), ChatMode::Law);
    }

    #[tokio::test]
    async fn test_upload_failure_notice() {
        let transport = MockTransport::new();
        transport.fail_upload(Some("Unsupported file type"));
        let (mut session, notifier) = session(&transport);

        let err = session
            .upload(DocumentUpload::new("x.png", &b""[..]), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Client(ClientError::Api { .. })));
        assert_eq!(notifier.messages(), vec!["Unsupported file type"]);
    }

    #[tokio::test]
    async fn test_delete_document() {
        let transport = MockTransport::new().with_documents(library_docs());
        let (mut session, notifier) = session(&transport);
        session.refresh_documents().await.unwrap();
        session.library_mut().select("A");
        session.library_mut().select("B");

        session.delete_document("A").await.unwrap();
        assert_eq!(session.library().selected(), ["B"]);
        assert_eq!(session.library().documents().len(), 1);

        transport.fail_delete(true);
        assert!(session.delete_document("B").await.is_err());
        assert_eq!(notifier.messages(), vec!["Document deleted", "Delete failed"]);
        assert!(session.library().is_selected("B"));
    }

    #[tokio::test]
    async fn test_refresh_failure_notice() {
        let transport = MockTransport::new();
        transport.fail_list(true);
        let (mut session, notifier) = session(&transport);

        assert!(session.refresh_documents().await.is_err());
        assert_eq!(notifier.messages(), vec!["Failed to fetch documents"]);
    }

    #[tokio::test]
    async fn test_view_document() {
        let transport = MockTransport::new().with_documents(library_docs());
        let (mut session, _) = session(&transport);
        session.refresh_documents().await.unwrap();

        let content = session.view_document("A").await.unwrap();
        assert_eq!(content.filename, "lease.pdf");
        assert_eq!(content.content, "THIS LEASE");

        let missing = session.view_document("zzz").await.unwrap();
        assert_eq!(missing.content, NO_CONTENT_PLACEHOLDER);
    }
}
