use std::collections::VecDeque;

/// Record separator byte that starts every record.
pub const RECORD_SEPARATOR: u8 = 0x1E;

/// Line feed byte that ends every record.
pub const LINE_FEED: u8 = 0x0A;

/// Default number of bytes requested per read.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Wraps encoded event text in a record: `0x1E`, text, `0x0A`.
pub fn format_record(text: &str) -> String {
    let mut record = String::with_capacity(text.len() + 2);
    record.push(char::from(RECORD_SEPARATOR));
    record.push_str(text);
    record.push(char::from(LINE_FEED));
    record
}

/// Shape of one separator-delimited piece of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Nothing between two separators (or before the first one).
    Empty,
    /// Ends with a line feed; ready to decode.
    Complete,
    /// Has content but no trailing line feed, e.g. a write cut short.
    Truncated,
}

impl FrameKind {
    /// Classifies the bytes between two separators.
    pub fn classify(bytes: &[u8]) -> Self {
        match bytes.last() {
            None => FrameKind::Empty,
            Some(&LINE_FEED) => FrameKind::Complete,
            Some(_) => FrameKind::Truncated,
        }
    }
}

/// One piece of the stream with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Byte offset of the record's first byte (just after its separator).
    pub offset: u64,
    /// Record bytes, separator excluded.
    pub bytes: Vec<u8>,
}

impl RawRecord {
    /// Classifies this record.
    pub fn kind(&self) -> FrameKind {
        FrameKind::classify(&self.bytes)
    }
}

/// Accumulates stream bytes and cuts them into records at each separator.
///
/// The buffer never holds a separator: everything up to the last separator
/// seen is handed out, and only the unterminated tail is kept.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: Vec<u8>,
    /// Stream offset of `pending[0]`.
    base: u64,
}

impl FrameBuffer {
    /// Creates an empty buffer positioned at stream offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `data` and moves every record it completes into `out`.
    ///
    /// Returns the number of records produced.
    pub fn push(&mut self, data: &[u8], out: &mut VecDeque<RawRecord>) -> usize {
        let scan_from = self.pending.len();
        self.pending.extend_from_slice(data);

        let mut produced = 0;
        let mut start = 0;
        for index in scan_from..self.pending.len() {
            if self.pending[index] == RECORD_SEPARATOR {
                out.push_back(RawRecord {
                    offset: self.base + start as u64,
                    bytes: self.pending[start..index].to_vec(),
                });
                produced += 1;
                start = index + 1;
            }
        }

        if start > 0 {
            self.pending.drain(..start);
            self.base += start as u64;
        }
        produced
    }

    /// Takes the unterminated tail at end of stream.
    ///
    /// Returns `None` if nothing is buffered.
    pub fn finish(&mut self) -> Option<RawRecord> {
        if self.pending.is_empty() {
            return None;
        }
        let bytes = std::mem::take(&mut self.pending);
        let offset = self.base;
        self.base += bytes.len() as u64;
        Some(RawRecord { offset, bytes })
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Discards buffered bytes.
    pub fn clear(&mut self) {
        self.base += self.pending.len() as u64;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(chunks: &[&[u8]]) -> Vec<RawRecord> {
        let mut buffer = FrameBuffer::new();
        let mut out = VecDeque::new();
        for chunk in chunks {
            buffer.push(chunk, &mut out);
        }
        out.extend(buffer.finish());
        out.into_iter().collect()
    }

    #[test]
    fn format_record_wraps_text() {
        assert_eq!(format_record("{}"), "\u{1e}{}\n");
    }

    #[test]
    fn classify_frames() {
        assert_eq!(FrameKind::classify(b""), FrameKind::Empty);
        assert_eq!(FrameKind::classify(b"{}\n"), FrameKind::Complete);
        assert_eq!(FrameKind::classify(b"{\"a\":"), FrameKind::Truncated);
    }

    #[test]
    fn splits_on_separator() {
        let records = split(&[b"\x1e{\"a\":1}\n\x1e{\"b\":2}\n"]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].bytes, b"");
        assert_eq!(records[1].bytes, b"{\"a\":1}\n");
        assert_eq!(records[1].offset, 1);
        assert_eq!(records[2].bytes, b"{\"b\":2}\n");
        assert_eq!(records[2].offset, 10);
    }

    #[test]
    fn record_spanning_chunks_is_reassembled() {
        let records = split(&[b"\x1e{\"te", b"xt\":", b"\"hi\"}\n\x1e", b"{}\n"]);
        let bytes: Vec<&[u8]> = records.iter().map(|r| r.bytes.as_slice()).collect();
        assert_eq!(bytes, vec![&b""[..], &b"{\"text\":\"hi\"}\n"[..], &b"{}\n"[..]]);
        assert_eq!(records[2].offset, 16);
    }

    #[test]
    fn push_reports_completed_records() {
        let mut buffer = FrameBuffer::new();
        let mut out = VecDeque::new();
        assert_eq!(buffer.push(b"\x1e{}\n", &mut out), 1);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.push(b"\x1e", &mut out), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn finish_on_empty_buffer_is_none() {
        let mut buffer = FrameBuffer::new();
        assert!(buffer.finish().is_none());
    }
}
