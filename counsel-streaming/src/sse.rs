//! Server-Sent Events consumption.
//!
//! [`EventStream`] adapts a chunked byte stream into decoded [`StreamEvent`]s;
//! [`consume`] drives such a stream through a [`Dispatcher`] to completion.

use crate::dispatch::{Dispatch, Dispatcher, StreamHandler, StreamOutcome};
use crate::error::{StreamError, StreamResult};
use crate::events::StreamEvent;
use crate::framer::LineFramer;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Stream adapter that frames and decodes an SSE byte stream.
    ///
    /// Yields events in wire order and ends right after the first `done` or
    /// `error` event, even if more bytes are buffered. A transport or framing
    /// failure is yielded once, then the stream ends.
    pub struct EventStream<S> {
        #[pin]
        inner: S,
        framer: LineFramer,
        pending: VecDeque<StreamEvent>,
        finished: bool,
        terminated: bool,
    }
}

impl<S> EventStream<S> {
    /// Create an event stream with the default line cap.
    pub fn new(inner: S) -> Self {
        Self::with_framer(inner, LineFramer::new())
    }

    /// Create an event stream with a preconfigured framer.
    pub fn with_framer(inner: S, framer: LineFramer) -> Self {
        Self {
            inner,
            framer,
            pending: VecDeque::new(),
            finished: false,
            terminated: false,
        }
    }

    /// Whether a terminal event has been yielded.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<S, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<StreamError>,
{
    type Item = StreamResult<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if *this.terminated {
                return Poll::Ready(None);
            }

            // Return decoded events first
            if let Some(event) = this.pending.pop_front() {
                if event.is_terminal() {
                    *this.terminated = true;
                    this.pending.clear();
                }
                return Poll::Ready(Some(Ok(event)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => match this.framer.feed(&bytes) {
                    Ok(lines) => {
                        this.pending
                            .extend(lines.iter().filter_map(|line| StreamEvent::from_line(line)));
                    }
                    Err(e) => {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    match this.framer.finish() {
                        Ok(0) => {}
                        Ok(discarded) => {
                            tracing::warn!(discarded, "Discarding unterminated SSE frame at end of stream");
                        }
                        Err(e) => return Poll::Ready(Some(Err(e))),
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Drive a byte stream to completion, delivering events to `handler`.
///
/// Reading stops at the first terminal event and the byte stream is dropped,
/// releasing the underlying connection. Malformed frames are skipped;
/// transport and framing failures are returned as errors.
pub async fn consume<S, E, H>(stream: S, handler: H) -> StreamResult<StreamOutcome>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<StreamError>,
    H: StreamHandler,
{
    consume_with_framer(stream, LineFramer::new(), handler).await
}

/// Like [`consume`], with a preconfigured framer.
pub async fn consume_with_framer<S, E, H>(
    stream: S,
    framer: LineFramer,
    handler: H,
) -> StreamResult<StreamOutcome>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<StreamError>,
    H: StreamHandler,
{
    let events = EventStream::with_framer(stream, framer);
    futures::pin_mut!(events);

    let mut dispatcher = Dispatcher::new(handler);
    while let Some(event) = events.next().await {
        if dispatcher.dispatch(event?) == Dispatch::Terminated {
            break;
        }
    }

    let outcome = dispatcher.outcome();
    tracing::debug!(
        events = dispatcher.dispatched(),
        outcome = ?outcome,
        "Answer stream finished"
    );
    Ok(outcome)
}
