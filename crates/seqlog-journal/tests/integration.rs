use seqlog_codec::{ErrorType, Failure, LogEvent, LogLevel, LogValue};
use seqlog_journal::{EventReader, EventWriter, JournalError, WriteOptions};
use std::fs;
use std::io::Write;
use tempfile::TempDir;

fn make_test_event(text: &str) -> LogEvent {
    let mut event = LogEvent::new();
    event.insert("log_namespace".to_string(), LogValue::from("test.journal"));
    event.insert("log_level".to_string(), LogValue::Level(LogLevel::Warn));
    event.insert("log_time".to_string(), LogValue::Float(1_700_000_000.5));
    event.insert("text".to_string(), LogValue::from(text));
    event
}

#[test]
fn test_write_read_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("events.log");

    {
        let mut writer = EventWriter::open(&log_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_test_event("first")).unwrap();
        writer.append_event(&make_test_event("second")).unwrap();
        writer.finish().unwrap();
    }

    {
        let mut reader = EventReader::open(&log_path).unwrap();
        let event1 = reader.read_event().unwrap().unwrap();
        let event2 = reader.read_event().unwrap().unwrap();
        let event3 = reader.read_event().unwrap();

        assert_eq!(event1, make_test_event("first"));
        assert_eq!(event2["text"], LogValue::from("second"));
        assert!(event3.is_none());
    }
}

#[test]
fn test_append_to_existing() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("events.log");

    {
        let mut writer = EventWriter::open(&log_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_test_event("first")).unwrap();
        writer.finish().unwrap();
    }

    {
        let mut writer = EventWriter::open(&log_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_test_event("second")).unwrap();
        writer.finish().unwrap();
    }

    let texts: Vec<LogValue> = EventReader::open(&log_path)
        .unwrap()
        .map(|event| event.unwrap()["text"].clone())
        .collect();
    assert_eq!(texts, vec![LogValue::from("first"), LogValue::from("second")]);
}

#[test]
fn test_truncate_existing() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("events.log");
    fs::write(&log_path, b"\x1e{\"old\":true}\n").unwrap();

    let options = WriteOptions {
        sync: true,
        create: true,
        append: false,
    };
    let mut writer = EventWriter::open(&log_path, options).unwrap();
    writer.append_event(&make_test_event("fresh")).unwrap();
    writer.finish().unwrap();

    let events: Vec<LogEvent> = EventReader::open(&log_path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(events.len(), 1);
    assert!(!events[0].contains_key("old"));
}

#[test]
fn test_open_missing_without_create() {
    let temp_dir = TempDir::new().unwrap();
    let options = WriteOptions {
        create: false,
        ..WriteOptions::default()
    };
    let result = EventWriter::open(temp_dir.path().join("missing.log"), options);
    assert!(matches!(result, Err(JournalError::Io(_))));
    assert!(matches!(
        EventReader::open(temp_dir.path().join("missing.log")),
        Err(JournalError::Io(_))
    ));
}

#[test]
fn test_file_bytes_are_framed() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("events.log");

    let mut writer = EventWriter::open(&log_path, WriteOptions::default()).unwrap();
    writer.append_raw(r#"{"text":"raw"}"#).unwrap();
    writer.finish().unwrap();

    assert_eq!(fs::read(&log_path).unwrap(), b"\x1e{\"text\":\"raw\"}\n");
}

#[test]
fn test_reader_sees_partial_write_as_truncated() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("events.log");

    {
        let mut writer = EventWriter::open(&log_path, WriteOptions::default()).unwrap();
        writer.append_event(&make_test_event("complete")).unwrap();
        writer.finish().unwrap();
    }
    {
        let mut file = fs::OpenOptions::new().append(true).open(&log_path).unwrap();
        file.write_all(b"\x1e{\"text\":\"half").unwrap();
    }

    let mut reader = EventReader::open(&log_path).unwrap();
    assert!(reader.read_event().unwrap().is_some());
    assert!(reader.read_event().unwrap().is_none());
}

#[test]
fn test_failure_survives_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("events.log");

    let failure = Failure::new(ErrorType::new("app.errors", "BoomError"))
        .with_field("message", "boom")
        .with_field("traceback", "line 1\nline 2\n");
    let mut event = make_test_event("failed");
    event.insert("log_failure".to_string(), failure.into());

    let mut writer = EventWriter::open(&log_path, WriteOptions::default()).unwrap();
    writer.append_event(&event).unwrap();
    writer.finish().unwrap();

    let mut reader = EventReader::open(&log_path).unwrap();
    assert_eq!(reader.read_event().unwrap().unwrap(), event);
}
