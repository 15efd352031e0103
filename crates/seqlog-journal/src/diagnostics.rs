//! Reporting of records the reader had to skip.

use seqlog_codec::DecodeError;
use std::borrow::Cow;
use std::fmt;

/// A record the reader skipped.
#[derive(Debug)]
pub enum RecordDiagnostic {
    /// The record ended with a line feed but could not be decoded.
    Malformed {
        /// Byte offset of the record in the stream.
        offset: u64,
        /// Raw record bytes.
        record: Vec<u8>,
        /// Why decoding failed.
        error: DecodeError,
    },
    /// The record had no trailing line feed.
    Truncated {
        /// Byte offset of the record in the stream.
        offset: u64,
        /// Raw record bytes.
        record: Vec<u8>,
    },
}

impl RecordDiagnostic {
    /// Byte offset of the skipped record.
    pub fn offset(&self) -> u64 {
        match self {
            RecordDiagnostic::Malformed { offset, .. }
            | RecordDiagnostic::Truncated { offset, .. } => *offset,
        }
    }

    /// Raw bytes of the skipped record.
    pub fn record(&self) -> &[u8] {
        match self {
            RecordDiagnostic::Malformed { record, .. }
            | RecordDiagnostic::Truncated { record, .. } => record,
        }
    }

    /// Record bytes as text, with invalid UTF-8 replaced.
    pub fn record_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.record())
    }
}

impl fmt::Display for RecordDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDiagnostic::Malformed { offset, error, .. } => {
                write!(f, "unable to read JSON record at offset {}: {}", offset, error)
            }
            RecordDiagnostic::Truncated { offset, record } => {
                write!(f, "truncated record at offset {} ({} bytes)", offset, record.len())
            }
        }
    }
}

/// Receives reports about skipped records.
pub trait DiagnosticSink {
    /// Called once per skipped record, in stream order.
    fn report(&mut self, diagnostic: RecordDiagnostic);
}

/// Logs skipped records through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&mut self, diagnostic: RecordDiagnostic) {
        match &diagnostic {
            RecordDiagnostic::Malformed { offset, error, .. } => tracing::error!(
                offset,
                %error,
                record = %diagnostic.record_text(),
                "Unable to read JSON record"
            ),
            RecordDiagnostic::Truncated { offset, record } => tracing::warn!(
                offset,
                len = record.len(),
                "Skipping truncated JSON record"
            ),
        }
    }
}

impl DiagnosticSink for Vec<RecordDiagnostic> {
    fn report(&mut self, diagnostic: RecordDiagnostic) {
        self.push(diagnostic);
    }
}

impl<D: DiagnosticSink + ?Sized> DiagnosticSink for &mut D {
    fn report(&mut self, diagnostic: RecordDiagnostic) {
        (**self).report(diagnostic);
    }
}

/// Counts skipped records and logs them like [`TracingDiagnostics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticCounter {
    /// Records that could not be decoded.
    pub malformed: u64,
    /// Records without a trailing line feed.
    pub truncated: u64,
}

impl DiagnosticCounter {
    /// Total skipped records.
    pub fn total(&self) -> u64 {
        self.malformed + self.truncated
    }
}

impl DiagnosticSink for DiagnosticCounter {
    fn report(&mut self, diagnostic: RecordDiagnostic) {
        match diagnostic {
            RecordDiagnostic::Malformed { .. } => self.malformed += 1,
            RecordDiagnostic::Truncated { .. } => self.truncated += 1,
        }
        TracingDiagnostics.report(diagnostic);
    }
}
