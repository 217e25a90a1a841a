//! Line framing for SSE byte streams.
//!
//! Reads arrive in arbitrary chunks. [`LineFramer`] buffers bytes until a
//! `\n` completes a line, so a frame split across reads (including a
//! multi-byte UTF-8 character split mid-sequence) is only ever emitted whole.

use crate::error::{StreamError, StreamResult};

/// Default cap on a buffered, not yet terminated line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Prefix of the only significant lines in the protocol.
pub const DATA_PREFIX: &str = "data: ";

/// Extract the payload of a `data: ` line. All other lines are ignored.
#[must_use]
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}

/// Splits a chunked byte stream into complete lines.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    // Prefix of `buffer` already known to hold no `\n`.
    scanned: usize,
    max_line_bytes: usize,
    overflowed: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Create a framer with the default line cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }

    /// Create a framer with a custom line cap.
    #[must_use]
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line_bytes,
            overflowed: false,
        }
    }

    /// The configured line cap.
    #[must_use]
    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    /// Bytes currently held for an incomplete line.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feed one chunk and return every line it completes, without the
    /// terminator. A trailing `\r` is stripped.
    ///
    /// If the leftover partial line outgrows the cap, the lines completed by
    /// this chunk are still returned and the next call fails with
    /// [`StreamError::LineTooLong`].
    pub fn feed(&mut self, chunk: &[u8]) -> StreamResult<Vec<String>> {
        if self.overflowed {
            return Err(self.overflow_error());
        }

        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut search = self.scanned;
        while let Some(offset) = self.buffer[search..].iter().position(|b| *b == b'\n') {
            let end = search + offset;
            let mut line = &self.buffer[start..end];
            if let [head @ .., b'\r'] = line {
                line = head;
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
            search = start;
        }
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_line_bytes {
            tracing::warn!(
                buffered = self.buffer.len(),
                limit = self.max_line_bytes,
                "SSE line exceeds limit, aborting stream"
            );
            self.buffer = Vec::new();
            self.scanned = 0;
            self.overflowed = true;
            if lines.is_empty() {
                return Err(self.overflow_error());
            }
        }

        Ok(lines)
    }

    /// Feed a string chunk.
    pub fn feed_str(&mut self, chunk: &str) -> StreamResult<Vec<String>> {
        self.feed(chunk.as_bytes())
    }

    /// Signal end of input. An unterminated tail is discarded, never
    /// emitted; the number of discarded bytes is returned.
    pub fn finish(&mut self) -> StreamResult<usize> {
        if self.overflowed {
            return Err(self.overflow_error());
        }
        let discarded = self.buffer.len();
        self.buffer.clear();
        self.scanned = 0;
        Ok(discarded)
    }

    fn overflow_error(&self) -> StreamError {
        StreamError::LineTooLong {
            limit: self.max_line_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WIRE: &str = concat!(
        "data: {\"type\":\"metadata\",\"sources_referenced\":[\"A\"]}\n\n",
        ": keep-alive\n\n",
        "data: {\"type\":\"content\",\"content\":\"Hello\"}\n\n",
        "data: {\"type\":\"content\",\"content\":\" wörld\"}\n\n",
        "data: {\"type\":\"done\"}\n\n",
    );

    fn payloads(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| data_payload(l).map(str::to_string))
            .collect()
    }

    fn frame_whole() -> Vec<String> {
        let mut framer = LineFramer::new();
        let lines = framer.feed_str(WIRE).unwrap();
        assert_eq!(framer.finish().unwrap(), 0);
        payloads(&lines)
    }

    #[test]
    fn test_splits_lines() {
        let mut framer = LineFramer::new();
        let lines = framer.feed_str("data: one\n\ndata: two\n").unwrap();
        assert_eq!(lines, vec!["data: one", "", "data: two"]);
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_buffers_partial_line() {
        let mut framer = LineFramer::new();
        assert!(framer.feed_str("data: hel").unwrap().is_empty());
        assert_eq!(framer.buffered_len(), 9);

        let lines = framer.feed_str("lo\n").unwrap();
        assert_eq!(lines, vec!["data: hello"]);
    }

    #[test]
    fn test_chunk_boundary_independence_two_pieces() {
        let expected = frame_whole();
        let bytes = WIRE.as_bytes();

        for split in 0..=bytes.len() {
            let mut framer = LineFramer::new();
            let mut lines = framer.feed(&bytes[..split]).unwrap();
            lines.extend(framer.feed(&bytes[split..]).unwrap());
            assert_eq!(framer.finish().unwrap(), 0);
            assert_eq!(payloads(&lines), expected, "split at byte {split}");
        }
    }

    #[test]
    fn test_chunk_boundary_independence_byte_at_a_time() {
        let mut framer = LineFramer::new();
        let mut lines = Vec::new();
        for byte in WIRE.as_bytes() {
            lines.extend(framer.feed(std::slice::from_ref(byte)).unwrap());
        }
        assert_eq!(payloads(&lines), frame_whole());
    }

    #[test]
    fn test_long_line_in_small_chunks_scans_each_byte_once() {
        let payload = "x".repeat(64 * 1024);
        let wire = format!("data: {payload}\r\n");
        let mut framer = LineFramer::new();
        let mut lines = Vec::new();
        for chunk in wire.as_bytes().chunks(16) {
            lines.extend(framer.feed(chunk).unwrap());
            assert_eq!(framer.scanned, framer.buffered_len());
        }
        assert_eq!(lines, vec![format!("data: {payload}")]);
        assert_eq!(framer.scanned, 0);
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.feed_str("data: x\r").unwrap().is_empty());
        assert_eq!(framer.feed_str("\ndata: y\n").unwrap(), vec!["data: x", "data: y"]);
    }

    #[test]
    fn test_split_utf8_is_reassembled() {
        let text = "data: ö\n".as_bytes();
        let mut framer = LineFramer::new();
        // Split inside the two-byte sequence for 'ö'.
        assert!(framer.feed(&text[..7]).unwrap().is_empty());
        let lines = framer.feed(&text[7..]).unwrap();
        assert_eq!(lines, vec!["data: ö"]);
    }

    #[test]
    fn test_crlf_stripped() {
        let mut framer = LineFramer::new();
        let lines = framer.feed_str("data: x\r\n\r\n").unwrap();
        assert_eq!(lines, vec!["data: x", ""]);
    }

    #[test]
    fn test_finish_discards_unterminated_tail() {
        let mut framer = LineFramer::new();
        let lines = framer
            .feed_str("data: {\"type\":\"done\"}\ndata: {\"type\":\"cont")
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(framer.finish().unwrap(), 19);
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_line_cap_without_complete_lines() {
        let mut framer = LineFramer::with_max_line_bytes(8);
        let err = framer.feed_str("data: 0123456789").unwrap_err();
        assert!(matches!(err, StreamError::LineTooLong { limit: 8 }));
        assert!(framer.finish().is_err());
    }

    #[test]
    fn test_line_cap_keeps_completed_lines_then_fails() {
        let mut framer = LineFramer::with_max_line_bytes(8);
        let lines = framer.feed_str("data: a\ndata: 0123456789").unwrap();
        assert_eq!(lines, vec!["data: a"]);
        assert!(matches!(
            framer.feed_str("\n"),
            Err(StreamError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_complete_long_lines_are_not_capped() {
        let mut framer = LineFramer::with_max_line_bytes(4);
        let lines = framer.feed_str("data: long enough\n").unwrap();
        assert_eq!(lines, vec!["data: long enough"]);
    }

    #[test]
    fn test_data_payload() {
        assert_eq!(data_payload("data: {}"), Some("{}"));
        assert_eq!(data_payload("data:{}"), None);
        assert_eq!(data_payload(": comment"), None);
        assert_eq!(data_payload(""), None);
    }
}
