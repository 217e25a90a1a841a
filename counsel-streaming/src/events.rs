//! Answer stream event types.
//!
//! Every `data: ` frame carries a JSON object with a `type` discriminator.
//! This module decodes those payloads into [`StreamEvent`].

use crate::error::{StreamError, StreamResult};
use crate::framer::data_payload;
use counsel_core::Metadata;
use serde_json::{json, Map, Value as JsonValue};
use std::fmt;

/// Message used when an `error` frame has no `message` field.
pub const DEFAULT_ERROR_MESSAGE: &str = "The server reported an error";

/// Events emitted by an answer stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Metadata about the answer (jurisdiction, documents used, chunk counts).
    Metadata(Metadata),
    /// A text fragment to append to the answer.
    Content(String),
    /// The answer finished successfully.
    Done,
    /// The server aborted the answer.
    Error(String),
}

impl StreamEvent {
    /// Create a content event.
    pub fn content(fragment: impl Into<String>) -> Self {
        Self::Content(fragment.into())
    }

    /// Create an error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Decode one frame payload (the text after `data: `).
    ///
    /// Returns `Ok(None)` for an unrecognised `type`, so newer servers can add
    /// event kinds without breaking older clients. Malformed payloads are
    /// `Err(StreamError::Decode)`.
    pub fn decode(payload: &str) -> StreamResult<Option<Self>> {
        let value: JsonValue =
            serde_json::from_str(payload).map_err(|e| StreamError::decode(e.to_string()))?;

        let JsonValue::Object(mut fields) = value else {
            return Err(StreamError::decode("frame is not a JSON object"));
        };

        let kind = match fields.remove("type") {
            Some(JsonValue::String(kind)) => kind,
            Some(_) => return Err(StreamError::decode("`type` is not a string")),
            None => return Err(StreamError::decode("missing `type` field")),
        };

        let event = match kind.as_str() {
            "metadata" => Self::Metadata(Metadata::from_map(fields)),
            "content" => match take_string(&mut fields, "content") {
                Some(fragment) => Self::Content(fragment),
                None => return Err(StreamError::decode("content frame without text")),
            },
            "done" => Self::Done,
            "error" => Self::Error(
                take_string(&mut fields, "message")
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            ),
            other => {
                tracing::debug!(event_type = other, "Ignoring unrecognised stream event");
                return Ok(None);
            }
        };

        Ok(Some(event))
    }

    /// Decode a raw line. Non-`data: ` lines and undecodable frames yield
    /// `None`; the latter are logged and dropped.
    #[must_use]
    pub fn from_line(line: &str) -> Option<Self> {
        let payload = data_payload(line)?;
        match Self::decode(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Failed to parse SSE data: {} - data: {}", e, payload);
                None
            }
        }
    }

    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }

    /// The wire name of this event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Metadata(_) => "metadata",
            Self::Content(_) => "content",
            Self::Done => "done",
            Self::Error(_) => "error",
        }
    }

    /// Encode as a wire frame, `data: <json>\n\n`.
    #[must_use]
    pub fn to_frame(&self) -> String {
        let payload = match self {
            Self::Metadata(metadata) => {
                let mut fields = metadata.as_map().clone();
                fields.insert("type".to_string(), json!("metadata"));
                JsonValue::Object(fields)
            }
            Self::Content(fragment) => json!({ "type": "content", "content": fragment }),
            Self::Done => json!({ "type": "done" }),
            Self::Error(message) => json!({ "type": "error", "message": message }),
        };
        format!("data: {payload}\n\n")
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata(m) => write!(f, "metadata ({} fields)", m.len()),
            Self::Content(c) => write!(f, "content ({} bytes)", c.len()),
            Self::Done => f.write_str("done"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

fn take_string(fields: &mut Map<String, JsonValue>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(JsonValue::String(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decode_metadata_passes_fields_through() {
        let event = StreamEvent::decode(
            r#"{"type":"metadata","jurisdiction":"nepal","chunks_found":4,"sources_referenced":["A"]}"#,
        )
        .unwrap()
        .unwrap();

        let StreamEvent::Metadata(metadata) = event else {
            panic!("expected metadata");
        };
        assert_eq!(metadata.jurisdiction(), Some("nepal"));
        assert_eq!(metadata.chunks_found(), Some(4));
        assert_eq!(metadata.sources(), vec!["A".to_string()]);
        assert!(metadata.get("type").is_none());
    }

    #[test]
    fn test_decode_content() {
        let event = StreamEvent::decode(r#"{"type":"content","content":"Hello"}"#).unwrap();
        assert_eq!(event, Some(StreamEvent::content("Hello")));
    }

    #[test]
    fn test_decode_done() {
        assert_eq!(
            StreamEvent::decode(r#"{"type":"done"}"#).unwrap(),
            Some(StreamEvent::Done)
        );
    }

    #[test]
    fn test_decode_error() {
        let event = StreamEvent::decode(r#"{"type":"error","message":"quota"}"#).unwrap();
        assert_eq!(event, Some(StreamEvent::error("quota")));

        let event = StreamEvent::decode(r#"{"type":"error"}"#).unwrap();
        assert_eq!(event, Some(StreamEvent::error(DEFAULT_ERROR_MESSAGE)));
    }

    #[test]
    fn test_unknown_type_is_dropped() {
        let event = StreamEvent::decode(r#"{"type":"citation","page":3}"#).unwrap();
        assert!(event.is_none());
    }

    #[rstest]
    #[case("{not valid json}")]
    #[case("[1, 2, 3]")]
    #[case(r#""content""#)]
    #[case(r#"{"content":"no type"}"#)]
    #[case(r#"{"type":7}"#)]
    #[case(r#"{"type":"content"}"#)]
    #[case(r#"{"type":"content","content":42}"#)]
    fn test_malformed_payloads(#[case] payload: &str) {
        let err = StreamEvent::decode(payload).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_from_line() {
        assert_eq!(
            StreamEvent::from_line(r#"data: {"type":"content","content":"ok"}"#),
            Some(StreamEvent::content("ok"))
        );
        assert!(StreamEvent::from_line("data: {not valid json}").is_none());
        assert!(StreamEvent::from_line(": comment").is_none());
        assert!(StreamEvent::from_line("").is_none());
    }

    #[test]
    fn test_to_frame_decodes_back() {
        let events = [
            StreamEvent::Metadata(Metadata::new().with("filename", "nda.pdf")),
            StreamEvent::content("line one\nline two"),
            StreamEvent::Done,
            StreamEvent::error("nope"),
        ];
        for event in events {
            let frame = event.to_frame();
            assert!(frame.ends_with("\n\n"));
            let line = frame.lines().next().unwrap();
            assert_eq!(StreamEvent::from_line(line), Some(event));
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(StreamEvent::Done.is_terminal());
        assert!(StreamEvent::error("x").is_terminal());
        assert!(!StreamEvent::content("x").is_terminal());
        assert_eq!(StreamEvent::Done.event_type(), "done");
    }
}
