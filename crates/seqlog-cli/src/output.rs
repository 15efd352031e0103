//! Output formatting utilities.

use chrono::{DateTime, SecondsFormat};
use seqlog_codec::{format_event, LogEvent, LogValue};

/// Formats `log_time` (seconds since the epoch) as RFC 3339.
pub fn format_time(event: &LogEvent) -> String {
    let Some(seconds) = event.get("log_time").and_then(LogValue::as_f64) else {
        return "-".to_string();
    };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(time) => time.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "-".to_string(),
    }
}

/// Name of the event's `log_level`, or `-`.
pub fn format_level(event: &LogEvent) -> &'static str {
    match event.get("log_level") {
        Some(LogValue::Level(level)) => level.name(),
        _ => "-",
    }
}

/// Rendered message: the `log_format` text, else the `text` field.
pub fn format_message(event: &LogEvent) -> String {
    let message = format_event(event);
    if !message.is_empty() {
        return message;
    }
    event
        .get("text")
        .and_then(LogValue::as_str)
        .unwrap_or("")
        .to_string()
}

/// Formats an event as a simple table row.
pub fn format_table_row(event: &LogEvent) -> String {
    let namespace = event
        .get("log_namespace")
        .and_then(LogValue::as_str)
        .unwrap_or("-");

    format!(
        "{:<24} {:<8} {:<20} {}",
        format_time(event),
        format_level(event),
        truncate(namespace, 20),
        format_message(event).replace('\n', "\\n")
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<24} {:<8} {:<20} {}",
        "TIME", "LEVEL", "NAMESPACE", "MESSAGE"
    );
    println!("{}", "-".repeat(80));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqlog_codec::LogLevel;

    #[test]
    fn formats_epoch_seconds() {
        let mut event = LogEvent::new();
        event.insert("log_time".to_string(), LogValue::Float(1_700_000_000.25));
        assert_eq!(format_time(&event), "2023-11-14T22:13:20.250Z");
    }

    #[test]
    fn missing_fields_render_as_dash() {
        let event = LogEvent::new();
        assert_eq!(format_time(&event), "-");
        assert_eq!(format_level(&event), "-");
        assert_eq!(format_message(&event), "");
    }

    #[test]
    fn row_includes_level_and_message() {
        let mut event = LogEvent::new();
        event.insert("log_level".to_string(), LogValue::Level(LogLevel::Error));
        event.insert("log_format".to_string(), LogValue::from("disk {disk} full"));
        event.insert("disk".to_string(), LogValue::from("sda"));
        let row = format_table_row(&event);
        assert!(row.contains("error"));
        assert!(row.ends_with("disk sda full"));
    }

    #[test]
    fn truncates_long_namespaces() {
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("abc", 6), "abc");
    }
}
