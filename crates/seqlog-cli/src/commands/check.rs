//! Check command implementation.

use seqlog_codec::EventCodec;
use seqlog_journal::{DiagnosticCounter, EventReader, ReaderOptions};
use serde_json::json;
use std::fs::File;

pub fn run(log: String, strict: bool, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&log).map_err(|e| format!("Failed to open log file: {}: {}", log, e))?;
    let mut reader = EventReader::with_parts(
        file,
        EventCodec::default(),
        DiagnosticCounter::default(),
        ReaderOptions::default(),
    );

    let mut events: u64 = 0;
    while reader.read_event()?.is_some() {
        events += 1;
    }
    let bytes = reader.position();
    let counter = reader.into_diagnostics();
    let ok = counter.total() == 0;

    if json_output {
        let summary = json!({
            "events": events,
            "malformed": counter.malformed,
            "truncated": counter.truncated,
            "bytes": bytes,
            "ok": ok,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{:<12} {}", "EVENTS", events);
        println!("{:<12} {}", "MALFORMED", counter.malformed);
        println!("{:<12} {}", "TRUNCATED", counter.truncated);
        println!("{:<12} {}", "BYTES", bytes);
        println!("{:<12} {}", "VERDICT", if ok { "ok" } else { "damaged" });
    }

    if strict && !ok {
        return Err(format!("{} records could not be read", counter.total()).into());
    }
    Ok(())
}
