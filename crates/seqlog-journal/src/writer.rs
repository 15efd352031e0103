//! Appending event writer.

use crate::errors::JournalError;
use crate::frame::{format_record, LINE_FEED};
use seqlog_codec::{EncodeReport, EventCodec, LogEvent};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Options for event writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
    /// Whether to append to an existing file (default: true).
    pub append: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
            append: true,
        }
    }
}

/// Writes events as record-separated JSON.
///
/// Each event becomes one record: `0x1E`, compact JSON, `0x0A`, written with
/// a single `write_all` and flushed, so concurrent readers never see a
/// partial record unless the write itself is cut short.
///
/// # Example
///
/// ```rust
/// use seqlog_codec::{LogEvent, LogLevel, LogValue};
/// use seqlog_journal::EventWriter;
///
/// let mut event = LogEvent::new();
/// event.insert("log_level".into(), LogValue::Level(LogLevel::Info));
/// event.insert("text".into(), "started".into());
///
/// let mut writer = EventWriter::new(Vec::new());
/// writer.append_event(&event)?;
/// assert!(writer.get_ref().starts_with(b"\x1e{"));
/// # Ok::<(), seqlog_journal::JournalError>(())
/// ```
pub struct EventWriter<W: Write> {
    sink: W,
    codec: EventCodec,
    sync_handle: Option<File>,
}

impl EventWriter<File> {
    /// Opens or creates a log file for writing.
    ///
    /// Existing content is kept when `options.append` is `true` and discarded
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the file cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let mut open = OpenOptions::new();
        open.create(options.create);
        if options.append {
            open.append(true);
        } else {
            open.write(true).truncate(true);
        }
        let file = open.open(path)?;

        let sync_handle = if options.sync {
            Some(file.try_clone()?)
        } else {
            None
        };

        Ok(Self {
            sink: file,
            codec: EventCodec::default(),
            sync_handle,
        })
    }
}

impl<W: Write> EventWriter<W> {
    /// Creates a writer over any byte sink with the standard codec.
    pub fn new(sink: W) -> Self {
        Self::with_codec(sink, EventCodec::default())
    }

    /// Creates a writer with an explicit codec.
    pub fn with_codec(sink: W, codec: EventCodec) -> Self {
        Self {
            sink,
            codec,
            sync_handle: None,
        }
    }

    /// Encodes and appends one event.
    ///
    /// Returns the encode report so callers can see which values were
    /// replaced with markers.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the write fails.
    pub fn append_event(&mut self, event: &LogEvent) -> Result<EncodeReport, JournalError> {
        let encoded = self.codec.encode_event(event);
        if !encoded.report.is_lossless() {
            tracing::debug!(
                unpersistable = ?encoded.report.unpersistable,
                dropped_keys = ?encoded.report.dropped_keys,
                "event encoded with substitutions"
            );
        }
        self.write_record(&encoded.text)?;
        Ok(encoded.report)
    }

    /// Appends already-encoded event text as one record.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::InvalidRecord`] if `text` contains a line feed
    /// or record separator, since either would break framing.
    pub fn append_raw(&mut self, text: &str) -> Result<(), JournalError> {
        if let Some(byte) = text
            .bytes()
            .find(|&b| b == LINE_FEED || b == crate::frame::RECORD_SEPARATOR)
        {
            return Err(JournalError::InvalidRecord(format!(
                "record text contains byte 0x{:02x}",
                byte
            )));
        }
        self.write_record(text)
    }

    fn write_record(&mut self, text: &str) -> Result<(), JournalError> {
        self.sink.write_all(format_record(text).as_bytes())?;
        self.sink.flush()?;
        if let Some(file) = &self.sync_handle {
            file.sync_data()?;
        }
        Ok(())
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flushes and closes the writer.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.sink.flush()?;
        if let Some(file) = &self.sync_handle {
            file.sync_all()?;
        }
        Ok(())
    }
}

impl<W: Write> Drop for EventWriter<W> {
    fn drop(&mut self) {
        let _ = self.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqlog_codec::LogValue;

    #[test]
    fn writes_one_record_per_event() {
        let mut writer = EventWriter::new(Vec::new());
        let mut event = LogEvent::new();
        event.insert("n".to_string(), LogValue::Int(1));
        writer.append_event(&event).unwrap();
        writer.append_event(&event).unwrap();
        assert_eq!(writer.get_ref().as_slice(), b"\x1e{\"n\":1}\n\x1e{\"n\":1}\n");
    }

    #[test]
    fn append_raw_rejects_line_feed() {
        let mut writer = EventWriter::new(Vec::new());
        assert!(matches!(
            writer.append_raw("{\"a\":\n1}"),
            Err(JournalError::InvalidRecord(_))
        ));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn reports_lossy_events() {
        let mut writer = EventWriter::new(Vec::new());
        let mut event = LogEvent::new();
        event.insert("socket".to_string(), LogValue::opaque("Socket"));
        let report = writer.append_event(&event).unwrap();
        assert_eq!(report.unpersistable, vec!["socket".to_string()]);
    }
}
