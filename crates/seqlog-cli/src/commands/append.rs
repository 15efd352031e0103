//! Append command implementation.

use crate::commands::open_input;
use seqlog_codec::{DecodeError, EventCodec};
use seqlog_journal::{EventWriter, WriteOptions};
use std::io::{BufRead, BufReader};
use thiserror::Error;

/// A JSON-lines input line that is not an event.
#[derive(Error, Debug)]
#[error("invalid event on line {line}: {source}")]
pub struct InvalidLine {
    line: usize,
    source: DecodeError,
}

pub fn run(
    log: String,
    input: Option<String>,
    sync: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = BufReader::new(open_input(input.as_deref())?);
    let codec = EventCodec::default();

    let options = WriteOptions {
        sync,
        ..WriteOptions::default()
    };
    let mut writer = EventWriter::open(&log, options)
        .map_err(|e| format!("Failed to open log file: {}: {}", log, e))?;

    let mut appended: u64 = 0;
    let mut lossy: u64 = 0;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = codec.decode_event(&line).map_err(|source| InvalidLine {
            line: index + 1,
            source,
        })?;
        let report = writer.append_event(&event)?;
        if !report.is_lossless() {
            lossy += 1;
        }
        appended += 1;
    }
    writer.finish()?;

    tracing::info!(log = %log, appended, lossy, "append finished");
    println!("Appended {} events to {}", appended, log);
    Ok(())
}
