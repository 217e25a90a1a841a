//! Routing decoded events to caller handlers.
//!
//! A [`Dispatcher`] invokes at most one handler method per event, in arrival
//! order, and latches after the first `done` or `error`: nothing is
//! delivered for that stream afterwards.

use crate::events::StreamEvent;
use counsel_core::Metadata;

/// Receiver of answer stream events. Every method defaults to a no-op.
pub trait StreamHandler {
    /// Metadata arrived.
    fn on_metadata(&mut self, _metadata: Metadata) {}

    /// A content fragment arrived.
    fn on_content(&mut self, _fragment: String) {}

    /// The stream finished successfully.
    fn on_done(&mut self) {}

    /// The server reported an error.
    fn on_error(&mut self, _message: String) {}
}

impl<H: StreamHandler + ?Sized> StreamHandler for &mut H {
    fn on_metadata(&mut self, metadata: Metadata) {
        (**self).on_metadata(metadata);
    }

    fn on_content(&mut self, fragment: String) {
        (**self).on_content(fragment);
    }

    fn on_done(&mut self) {
        (**self).on_done();
    }

    fn on_error(&mut self, message: String) {
        (**self).on_error(message);
    }
}

type Slot<'a, T> = Option<Box<dyn FnMut(T) + Send + 'a>>;

/// Closure-based handler with four optional slots.
///
/// # Example
///
/// ```rust
/// use counsel_streaming::{Dispatcher, StreamCallbacks, StreamEvent};
///
/// let mut answer = String::new();
/// let mut dispatcher = Dispatcher::new(
///     StreamCallbacks::new().on_content(|fragment| answer.push_str(&fragment)),
/// );
/// dispatcher.dispatch(StreamEvent::content("Hello"));
/// dispatcher.dispatch(StreamEvent::Done);
/// dispatcher.dispatch(StreamEvent::content(" ignored"));
/// drop(dispatcher);
/// assert_eq!(answer, "Hello");
/// ```
#[derive(Default)]
pub struct StreamCallbacks<'a> {
    metadata: Slot<'a, Metadata>,
    content: Slot<'a, String>,
    done: Option<Box<dyn FnMut() + Send + 'a>>,
    error: Slot<'a, String>,
}

impl<'a> StreamCallbacks<'a> {
    /// Create callbacks with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metadata callback.
    #[must_use]
    pub fn on_metadata(mut self, f: impl FnMut(Metadata) + Send + 'a) -> Self {
        self.metadata = Some(Box::new(f));
        self
    }

    /// Set the content callback.
    #[must_use]
    pub fn on_content(mut self, f: impl FnMut(String) + Send + 'a) -> Self {
        self.content = Some(Box::new(f));
        self
    }

    /// Set the done callback.
    #[must_use]
    pub fn on_done(mut self, f: impl FnMut() + Send + 'a) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    /// Set the error callback.
    #[must_use]
    pub fn on_error(mut self, f: impl FnMut(String) + Send + 'a) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for StreamCallbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("metadata", &self.metadata.is_some())
            .field("content", &self.content.is_some())
            .field("done", &self.done.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

impl StreamHandler for StreamCallbacks<'_> {
    fn on_metadata(&mut self, metadata: Metadata) {
        if let Some(f) = self.metadata.as_mut() {
            f(metadata);
        }
    }

    fn on_content(&mut self, fragment: String) {
        if let Some(f) = self.content.as_mut() {
            f(fragment);
        }
    }

    fn on_done(&mut self) {
        if let Some(f) = self.done.as_mut() {
            f();
        }
    }

    fn on_error(&mut self, message: String) {
        if let Some(f) = self.error.as_mut() {
            f(message);
        }
    }
}

/// Whether dispatching should continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Keep feeding events.
    Continue,
    /// A terminal event was delivered; stop reading.
    Terminated,
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// A `done` event was delivered.
    Completed,
    /// An `error` event was delivered.
    ServerError(String),
    /// The body closed without a terminal event.
    Ended,
}

impl StreamOutcome {
    /// Whether the answer completed normally.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Delivers events to a [`StreamHandler`] until a terminal event.
#[derive(Debug)]
pub struct Dispatcher<H> {
    handler: H,
    outcome: Option<StreamOutcome>,
    dispatched: usize,
}

impl<H: StreamHandler> Dispatcher<H> {
    /// Wrap a handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            outcome: None,
            dispatched: 0,
        }
    }

    /// Deliver one event.
    pub fn dispatch(&mut self, event: StreamEvent) -> Dispatch {
        if self.outcome.is_some() {
            tracing::debug!(event = %event, "Dropping event after end of stream");
            return Dispatch::Terminated;
        }

        self.dispatched += 1;
        match event {
            StreamEvent::Metadata(metadata) => self.handler.on_metadata(metadata),
            StreamEvent::Content(fragment) => self.handler.on_content(fragment),
            StreamEvent::Done => {
                self.outcome = Some(StreamOutcome::Completed);
                self.handler.on_done();
                return Dispatch::Terminated;
            }
            StreamEvent::Error(message) => {
                self.outcome = Some(StreamOutcome::ServerError(message.clone()));
                self.handler.on_error(message);
                return Dispatch::Terminated;
            }
        }
        Dispatch::Continue
    }

    /// Whether a terminal event has been delivered.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.outcome.is_some()
    }

    /// Number of events delivered to the handler.
    #[must_use]
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// The outcome so far; [`StreamOutcome::Ended`] if not terminated.
    #[must_use]
    pub fn outcome(&self) -> StreamOutcome {
        self.outcome.clone().unwrap_or(StreamOutcome::Ended)
    }

    /// Borrow the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Unwrap the handler.
    pub fn into_inner(self) -> H {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl StreamHandler for Recorder {
        fn on_metadata(&mut self, metadata: Metadata) {
            self.calls.push(format!("metadata:{}", metadata.len()));
        }

        fn on_content(&mut self, fragment: String) {
            self.calls.push(format!("content:{fragment}"));
        }

        fn on_done(&mut self) {
            self.calls.push("done".into());
        }

        fn on_error(&mut self, message: String) {
            self.calls.push(format!("error:{message}"));
        }
    }

    #[test]
    fn test_dispatch_in_order() {
        let mut dispatcher = Dispatcher::new(Recorder::default());
        dispatcher.dispatch(StreamEvent::Metadata(
            Metadata::new().with("sources_referenced", json!(["A"])),
        ));
        dispatcher.dispatch(StreamEvent::content("a"));
        dispatcher.dispatch(StreamEvent::content("b"));
        assert_eq!(dispatcher.dispatch(StreamEvent::Done), Dispatch::Terminated);

        assert_eq!(
            dispatcher.into_inner().calls,
            vec!["metadata:1", "content:a", "content:b", "done"]
        );
    }

    #[test]
    fn test_nothing_after_done() {
        let mut dispatcher = Dispatcher::new(Recorder::default());
        dispatcher.dispatch(StreamEvent::Done);
        assert_eq!(
            dispatcher.dispatch(StreamEvent::content("late")),
            Dispatch::Terminated
        );
        assert_eq!(dispatcher.dispatch(StreamEvent::error("late")), Dispatch::Terminated);
        assert_eq!(dispatcher.dispatched(), 1);
        assert_eq!(dispatcher.outcome(), StreamOutcome::Completed);
        assert_eq!(dispatcher.handler().calls, vec!["done"]);
    }

    #[test]
    fn test_nothing_after_error() {
        let mut dispatcher = Dispatcher::new(Recorder::default());
        dispatcher.dispatch(StreamEvent::content("partial"));
        dispatcher.dispatch(StreamEvent::error("model overloaded"));
        dispatcher.dispatch(StreamEvent::Done);

        assert_eq!(
            dispatcher.outcome(),
            StreamOutcome::ServerError("model overloaded".into())
        );
        assert_eq!(
            dispatcher.into_inner().calls,
            vec!["content:partial", "error:model overloaded"]
        );
    }

    #[test]
    fn test_outcome_ended_when_not_terminated() {
        let mut dispatcher = Dispatcher::new(Recorder::default());
        assert_eq!(
            dispatcher.dispatch(StreamEvent::content("x")),
            Dispatch::Continue
        );
        assert!(!dispatcher.is_terminated());
        assert_eq!(dispatcher.outcome(), StreamOutcome::Ended);
    }

    #[test]
    fn test_missing_callbacks_are_noops() {
        let mut errors = Vec::new();
        {
            let mut dispatcher =
                Dispatcher::new(StreamCallbacks::new().on_error(|m| errors.push(m)));
            dispatcher.dispatch(StreamEvent::Metadata(Metadata::new()));
            dispatcher.dispatch(StreamEvent::content("unheard"));
            dispatcher.dispatch(StreamEvent::error("boom"));
        }
        assert_eq!(errors, vec!["boom".to_string()]);
    }

    #[test]
    fn test_borrowed_handler() {
        let mut recorder = Recorder::default();
        {
            let mut dispatcher = Dispatcher::new(&mut recorder);
            dispatcher.dispatch(StreamEvent::content("x"));
        }
        assert_eq!(recorder.calls, vec!["content:x"]);
    }
}
