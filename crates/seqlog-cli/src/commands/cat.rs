//! Cat command implementation.

use crate::commands::open_input;
use crate::output;
use seqlog_codec::EventCodec;
use seqlog_journal::EventReader;

pub fn run(
    log: Option<String>,
    json: bool,
    max_events: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = EventReader::new(open_input(log.as_deref())?);
    let codec = EventCodec::default();

    if !json {
        output::print_table_header();
    }

    let mut event_count: u64 = 0;
    while let Some(event) = reader.read_event()? {
        if let Some(max) = max_events {
            if event_count >= max {
                break;
            }
        }

        if json {
            println!("{}", codec.encode_event(&event).text);
        } else {
            println!("{}", output::format_table_row(&event));
        }
        event_count += 1;
    }

    Ok(())
}
