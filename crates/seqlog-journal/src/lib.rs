//! Record-separated JSON log files.
//!
//! A log file is a sequence of records, each `0x1E`, one line of compact JSON
//! produced by [`seqlog_codec`], and `0x0A`. Readers resynchronize on the
//! next separator, so a corrupt or half-written record costs only itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seqlog_codec::{LogEvent, LogValue};
//! use seqlog_journal::{EventReader, EventWriter, WriteOptions};
//!
//! let mut event = LogEvent::new();
//! event.insert("text".into(), LogValue::from("hello"));
//!
//! let mut writer = EventWriter::open("events.log", WriteOptions::default())?;
//! writer.append_event(&event)?;
//! writer.finish()?;
//!
//! let mut reader = EventReader::open("events.log")?;
//! while let Some(event) = reader.read_event()? {
//!     println!("{:?}", event.get("text"));
//! }
//! # Ok::<(), seqlog_journal::JournalError>(())
//! ```
//!
//! ## Key Types
//!
//! - [`EventWriter`] - Append events to a log
//! - [`EventReader`] - Stream events out of a log
//! - [`DiagnosticSink`] - Observe records the reader skipped

#![deny(missing_docs)]

/// Reporting of skipped records.
pub mod diagnostics;
/// Error types for log reading and writing.
pub mod errors;
/// Record framing on `0x1E` separators.
pub mod frame;
/// Streaming event reader.
pub mod reader;
/// Appending event writer.
pub mod writer;

pub use diagnostics::{DiagnosticCounter, DiagnosticSink, RecordDiagnostic, TracingDiagnostics};
pub use errors::JournalError;
pub use frame::{format_record, FrameBuffer, FrameKind, RawRecord, RECORD_SEPARATOR};
pub use reader::{EventReader, ReaderOptions};
pub use seqlog_codec::LogEvent;
pub use writer::{EventWriter, WriteOptions};
