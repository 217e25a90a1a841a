//! The conversation state machine.
//!
//! A [`Conversation`] owns the ordered message list and the streaming flag.
//! It changes only through [`Conversation::apply`], which takes one
//! [`ChatAction`] and returns a [`Transition`]: the request to send (if a
//! send was accepted), the reason a send was rejected, and any notices for
//! the user.
//!
//! ```rust
//! use counsel_chat::{ChatAction, Conversation};
//! use counsel_core::{ChatMode, Metadata};
//!
//! let mut chat = Conversation::new();
//! let sent = chat.apply(ChatAction::send("Summarize", ChatMode::Ask, vec!["A".into()]));
//! assert!(sent.request.is_some());
//!
//! chat.apply(ChatAction::Metadata(Metadata::new().with("documents_used", vec!["A"])));
//! chat.apply(ChatAction::Content("Hello".into()));
//! chat.apply(ChatAction::Content(" world".into()));
//! chat.apply(ChatAction::Done);
//!
//! let answer = chat.last_message().unwrap();
//! assert_eq!(answer.content, "Hello world");
//! assert_eq!(answer.sources, vec!["A".to_string()]);
//! assert!(!chat.is_streaming());
//! ```

use crate::notify::Notification;
use crate::state::{ChatState, TurnOutcome};
use counsel_client::types::{
    AskLawQuestionRequest, AskQuestionRequest, CompareDocumentsRequest, ReviewContractRequest,
};
use counsel_client::StreamRequest;
use counsel_core::{ChatMessage, ChatMode, ConversationId, MessageStatus, Metadata, PreconditionError};
use counsel_streaming::StreamEvent;

/// Jurisdiction sent with law questions unless configured otherwise.
pub const DEFAULT_JURISDICTION: &str = "general";
/// Law chunks retrieved unless configured otherwise.
pub const DEFAULT_TOP_K: u32 = 5;

/// Everything that can happen to a conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    /// The user asked a question.
    Send {
        /// Raw input; trimmed before use.
        question: String,
        /// Active mode.
        mode: ChatMode,
        /// Selected document IDs, in selection order.
        selection: Vec<String>,
    },
    /// The stream sent metadata.
    Metadata(Metadata),
    /// The stream sent a content fragment.
    Content(String),
    /// The stream finished.
    Done,
    /// The server reported an error.
    Error(String),
    /// The request or stream failed on the client side.
    Failed(String),
}

impl ChatAction {
    /// Build a send action.
    pub fn send(question: impl Into<String>, mode: ChatMode, selection: Vec<String>) -> Self {
        Self::Send {
            question: question.into(),
            mode,
            selection,
        }
    }
}

impl From<StreamEvent> for ChatAction {
    fn from(event: StreamEvent) -> Self {
        match event {
            StreamEvent::Metadata(m) => Self::Metadata(m),
            StreamEvent::Content(c) => Self::Content(c),
            StreamEvent::Done => Self::Done,
            StreamEvent::Error(m) => Self::Error(m),
        }
    }
}

/// The effects of applying one action.
#[derive(Debug, Default, PartialEq)]
pub struct Transition {
    /// The request to send, when a send was accepted.
    pub request: Option<StreamRequest>,
    /// Why a send was rejected.
    pub rejection: Option<PreconditionError>,
    /// Notices for the user.
    pub notifications: Vec<Notification>,
}

impl Transition {
    fn rejected(err: PreconditionError) -> Self {
        Self {
            request: None,
            notifications: vec![Notification::error(err.to_string())],
            rejection: Some(err),
        }
    }

    fn notify(notification: Notification) -> Self {
        Self {
            notifications: vec![notification],
            ..Self::default()
        }
    }

    /// Whether the action changed nothing and said nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.request.is_none() && self.rejection.is_none() && self.notifications.is_empty()
    }
}

/// An ordered chat with at most one answer in flight.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    messages: Vec<ChatMessage>,
    state: ChatState,
    /// Index of the assistant message receiving content.
    current: Option<usize>,
    last_outcome: Option<TurnOutcome>,
    jurisdiction: String,
    top_k: u32,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            state: ChatState::Idle,
            current: None,
            last_outcome: None,
            jurisdiction: DEFAULT_JURISDICTION.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the jurisdiction used for law questions.
    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = jurisdiction.into();
        self
    }

    /// Set the number of law chunks requested.
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Conversation ID.
    #[must_use]
    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Messages in display order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The newest message.
    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The assistant message currently receiving content.
    #[must_use]
    pub fn streaming_message(&self) -> Option<&ChatMessage> {
        self.current.and_then(|i| self.messages.get(i))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Whether an answer is in flight.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming()
    }

    /// How the most recent answer ended.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&TurnOutcome> {
        self.last_outcome.as_ref()
    }

    /// Number of error messages in the conversation.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_error()).count()
    }

    /// Apply one action.
    pub fn apply(&mut self, action: ChatAction) -> Transition {
        match action {
            ChatAction::Send {
                question,
                mode,
                selection,
            } => self.send(&question, mode, selection),
            ChatAction::Metadata(metadata) => {
                if self.ignore_stale("metadata") {
                    return Transition::default();
                }
                self.on_metadata(metadata);
                Transition::default()
            }
            ChatAction::Content(fragment) => {
                if self.ignore_stale("content") {
                    return Transition::default();
                }
                self.placeholder().content.push_str(&fragment);
                Transition::default()
            }
            ChatAction::Done => {
                if self.ignore_stale("done") {
                    return Transition::default();
                }
                self.on_done();
                Transition::default()
            }
            ChatAction::Error(message) => {
                if self.ignore_stale("error") {
                    return Transition::default();
                }
                self.fail(message.clone(), TurnOutcome::ServerError(message))
            }
            ChatAction::Failed(message) => {
                if self.ignore_stale("failure") {
                    return Transition::default();
                }
                self.fail(message.clone(), TurnOutcome::Failed(message))
            }
        }
    }

    fn send(&mut self, question: &str, mode: ChatMode, selection: Vec<String>) -> Transition {
        let question = question.trim();
        if question.is_empty() {
            return Transition::rejected(PreconditionError::EmptyInput);
        }
        if self.is_streaming() {
            tracing::debug!(conversation = %self.id, "Send rejected while streaming");
            return Transition::rejected(PreconditionError::StreamInProgress);
        }
        if let Err(err) = PreconditionError::check_selection(mode, selection.len()) {
            return Transition::rejected(err);
        }

        let request = self.build_request(question, mode, selection);
        self.messages.push(ChatMessage::user(question));
        self.state = ChatState::Sending;
        self.current = None;
        tracing::debug!(conversation = %self.id, mode = %mode, "Question accepted");

        Transition {
            request: Some(request),
            ..Transition::default()
        }
    }

    fn build_request(&self, question: &str, mode: ChatMode, selection: Vec<String>) -> StreamRequest {
        match mode {
            ChatMode::Ask => StreamRequest::AskQuestion(AskQuestionRequest {
                document_ids: selection,
                question: question.to_string(),
            }),
            ChatMode::Compare => StreamRequest::CompareDocuments(CompareDocumentsRequest {
                document_ids: selection,
                comparison_criteria: Some(question.to_string()),
            }),
            ChatMode::Law => StreamRequest::AskLawQuestion(AskLawQuestionRequest {
                question: question.to_string(),
                jurisdiction: self.jurisdiction.clone(),
                top_k: self.top_k,
            }),
            ChatMode::Review => StreamRequest::ReviewContract(ReviewContractRequest {
                document_id: selection.into_iter().next().unwrap_or_default(),
            }),
        }
    }

    fn ignore_stale(&self, what: &str) -> bool {
        if self.is_streaming() {
            return false;
        }
        tracing::debug!(conversation = %self.id, event = what, "Ignoring event with no answer in flight");
        true
    }

    /// The in-progress assistant message, created on first use.
    fn placeholder(&mut self) -> &mut ChatMessage {
        let index = match self.current {
            Some(i) => i,
            None => {
                self.messages.push(ChatMessage::assistant_placeholder());
                let i = self.messages.len() - 1;
                self.current = Some(i);
                self.state = ChatState::StreamingContent;
                i
            }
        };
        &mut self.messages[index]
    }

    fn on_metadata(&mut self, metadata: Metadata) {
        self.placeholder().merge_metadata(metadata);
    }

    fn on_done(&mut self) {
        let message = self.placeholder();
        message.status = MessageStatus::Complete;
        tracing::debug!(conversation = %self.id, "Answer complete");
        self.finish(TurnOutcome::Answered);
    }

    fn fail(&mut self, message: String, outcome: TurnOutcome) -> Transition {
        if let Some(i) = self.current {
            if self.messages[i].content.is_empty() {
                self.messages.remove(i);
            } else {
                self.messages[i].status = MessageStatus::Complete;
            }
        }
        tracing::debug!(conversation = %self.id, error = %message, "Answer failed");

        self.messages.push(ChatMessage::error(message.clone()));
        self.finish(outcome);
        Transition::notify(Notification::error(message))
    }

    fn finish(&mut self, outcome: TurnOutcome) {
        self.current = None;
        self.state = ChatState::Idle;
        self.last_outcome = Some(outcome);
    }
}
