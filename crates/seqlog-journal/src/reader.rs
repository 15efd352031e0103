//! Streaming event reader.

use crate::diagnostics::{DiagnosticSink, RecordDiagnostic, TracingDiagnostics};
use crate::errors::JournalError;
use crate::frame::{FrameBuffer, FrameKind, RawRecord, DEFAULT_CHUNK_SIZE};
use seqlog_codec::{EventCodec, LogEvent};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Options for event reading.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Bytes requested per read call (default: 4096, minimum 1).
    pub chunk_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    AwaitingData,
    HaveRecords,
    Exhausted,
}

/// Reads events from a stream of record-separated JSON.
///
/// Records are decoded lazily as the caller asks for events. Records that are
/// empty are skipped silently; records that are truncated or fail to decode
/// are skipped and reported to the reader's [`DiagnosticSink`]. A read error
/// ends the stream.
///
/// # Example
///
/// ```rust
/// use seqlog_journal::EventReader;
///
/// let data: &[u8] = b"\x1e{\"text\":\"hello\"}\n\x1e{\"text\":\"world\"}\n";
/// let mut reader = EventReader::new(data);
/// while let Some(event) = reader.read_event()? {
///     println!("{:?}", event["text"]);
/// }
/// # Ok::<(), seqlog_journal::JournalError>(())
/// ```
pub struct EventReader<R, D = TracingDiagnostics> {
    source: R,
    codec: EventCodec,
    diagnostics: D,
    buffer: FrameBuffer,
    records: VecDeque<RawRecord>,
    chunk: Vec<u8>,
    state: ReaderState,
    position: u64,
}

impl EventReader<File> {
    /// Opens a log file for reading with the standard codec.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, JournalError> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> EventReader<R> {
    /// Creates a reader over `source` that logs skipped records via `tracing`.
    pub fn new(source: R) -> Self {
        Self::with_parts(
            source,
            EventCodec::default(),
            TracingDiagnostics,
            ReaderOptions::default(),
        )
    }
}

impl<R: Read, D: DiagnosticSink> EventReader<R, D> {
    /// Creates a reader with an explicit codec, diagnostic sink and options.
    pub fn with_parts(
        source: R,
        codec: EventCodec,
        diagnostics: D,
        options: ReaderOptions,
    ) -> Self {
        Self {
            source,
            codec,
            diagnostics,
            buffer: FrameBuffer::new(),
            records: VecDeque::new(),
            chunk: vec![0u8; options.chunk_size.max(1)],
            state: ReaderState::AwaitingData,
            position: 0,
        }
    }

    /// Number of bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The diagnostic sink.
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Consumes the reader and returns its diagnostic sink.
    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }

    /// Reads the next event.
    ///
    /// Returns `Ok(None)` at end of stream. An I/O error is returned once;
    /// after it the reader yields `Ok(None)`.
    pub fn read_event(&mut self) -> Result<Option<LogEvent>, JournalError> {
        loop {
            match self.state {
                ReaderState::HaveRecords => match self.records.pop_front() {
                    Some(record) => {
                        if let Some(event) = self.decode_record(record) {
                            return Ok(Some(event));
                        }
                    }
                    None => self.state = ReaderState::AwaitingData,
                },
                ReaderState::AwaitingData => self.fill()?,
                // The unterminated tail is queued when the source ends.
                ReaderState::Exhausted => match self.records.pop_front() {
                    Some(record) => {
                        if let Some(event) = self.decode_record(record) {
                            return Ok(Some(event));
                        }
                    }
                    None => return Ok(None),
                },
            }
        }
    }

    fn fill(&mut self) -> Result<(), JournalError> {
        let read = loop {
            match self.source.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.state = ReaderState::Exhausted;
                    self.buffer.clear();
                    return Err(e.into());
                }
            }
        };

        if read == 0 {
            self.records.extend(self.buffer.finish());
            self.state = ReaderState::Exhausted;
            return Ok(());
        }

        self.position += read as u64;
        if self.buffer.push(&self.chunk[..read], &mut self.records) > 0 {
            self.state = ReaderState::HaveRecords;
        }
        Ok(())
    }

    fn decode_record(&mut self, record: RawRecord) -> Option<LogEvent> {
        match record.kind() {
            FrameKind::Empty => None,
            FrameKind::Truncated => {
                self.diagnostics.report(RecordDiagnostic::Truncated {
                    offset: record.offset,
                    record: record.bytes,
                });
                None
            }
            FrameKind::Complete => match self.codec.decode_event_bytes(&record.bytes) {
                Ok(event) => Some(event),
                Err(error) => {
                    self.diagnostics.report(RecordDiagnostic::Malformed {
                        offset: record.offset,
                        record: record.bytes,
                        error,
                    });
                    None
                }
            },
        }
    }
}

impl<R: Read, D: DiagnosticSink> Iterator for EventReader<R, D> {
    type Item = Result<LogEvent, JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}
