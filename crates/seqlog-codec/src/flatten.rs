//! Format-string flattening.
//!
//! An event may carry a `log_format` string such as
//! `"{user} logged in from {peer.host}"`. Values referenced by the format may
//! not survive encoding (opaque handles, nested failures), so before encoding
//! the rendered text of every reference is copied into a `log_flattened` map.
//! Readers can then render the message without the original values.
//!
//! Keys of `log_flattened` are `"<field>!<conversion>:<spec>"`. The rendered
//! text is stored under conversion `s` (or `r` when the format asks for it),
//! and the referenced value itself under an empty conversion. Format specs are
//! kept in the key but not applied when rendering.

use crate::value::{LogEvent, LogValue};
use std::collections::BTreeMap;

/// Event field holding the format string.
pub const LOG_FORMAT_KEY: &str = "log_format";

/// Event field holding flattened format references.
pub const LOG_FLATTENED_KEY: &str = "log_flattened";

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldRef<'a> {
    name: &'a str,
    conversion: &'a str,
    spec: &'a str,
}

impl<'a> FieldRef<'a> {
    fn parse(text: &'a str) -> Self {
        let name_end = text.find(['!', ':']).unwrap_or(text.len());
        let name = &text[..name_end];
        let rest = &text[name_end..];
        let (conversion, spec) = match rest.strip_prefix('!') {
            Some(after) => match after.split_once(':') {
                Some((conversion, spec)) => (conversion, spec),
                None => (after, ""),
            },
            None => ("", rest.strip_prefix(':').unwrap_or("")),
        };
        Self {
            name,
            conversion,
            spec,
        }
    }

    fn is_repr(&self) -> bool {
        self.conversion == "r"
    }

    fn key(&self, conversion: &str) -> String {
        format!("{}!{}:{}", self.name, conversion, self.spec)
    }

    fn rendered_key(&self) -> String {
        self.key(if self.is_repr() { "r" } else { "s" })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Literal(String),
    Field(FieldRef<'a>),
}

fn parse_format(format: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = format;

    while let Some(pos) = rest.find(['{', '}']) {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            literal.push_str(&tail[..1]);
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            literal.push('}');
            rest = &tail[1..];
        } else if let Some(end) = tail.find('}') {
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Field(FieldRef::parse(&tail[1..end])));
            rest = &tail[end + 1..];
        } else {
            // Unterminated reference
            literal.push_str(tail);
            rest = "";
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    pieces
}

/// Follows a reference like `peer.host` or `items[0]` through the event.
fn resolve_field<'e>(event: &'e LogEvent, name: &str) -> Option<&'e LogValue> {
    let name = name.strip_suffix("()").unwrap_or(name);
    let root_end = name.find(['.', '[']).unwrap_or(name.len());
    let mut value = event.get(&name[..root_end])?;
    let mut rest = &name[root_end..];

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            value = value.get(&after[..end])?;
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']')?;
            let key = &after[..end];
            value = match (value, key.parse::<usize>()) {
                (LogValue::Array(items), Ok(index)) => items.get(index)?,
                _ => value.get(key)?,
            };
            rest = &after[end + 1..];
        } else {
            return None;
        }
    }
    Some(value)
}

/// Renders a value as message text. `repr` quotes text values.
fn render(value: &LogValue, repr: bool) -> String {
    match value {
        LogValue::Null => "null".to_string(),
        LogValue::Bool(b) => b.to_string(),
        LogValue::Int(i) => i.to_string(),
        LogValue::Float(f) => f.to_string(),
        LogValue::Text(s) if repr => format!("{:?}", s),
        LogValue::Text(s) => s.clone(),
        LogValue::Bytes(bytes) => {
            let text: String = bytes.iter().map(|&b| char::from(b)).collect();
            if repr {
                format!("{:?}", text)
            } else {
                text
            }
        }
        LogValue::Array(items) => {
            let items: Vec<String> = items.iter().map(|item| render(item, true)).collect();
            format!("[{}]", items.join(", "))
        }
        LogValue::Map(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{:?}: {}", k, render(v, true)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        LogValue::Mapping(pairs) => {
            let entries: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", render(k, true), render(v, true)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        LogValue::Level(level) => level.name().to_string(),
        LogValue::Failure(failure) => failure.to_string(),
        LogValue::Opaque { type_name } => format!("<{}>", type_name),
    }
}

/// Copies the rendered text of every `log_format` reference into
/// `log_flattened`.
///
/// Does nothing for events without a text `log_format`. References that do
/// not resolve are skipped; existing `log_flattened` entries are kept.
pub fn flatten_event(event: &mut LogEvent) {
    let Some(format) = event.get(LOG_FORMAT_KEY).and_then(LogValue::as_str) else {
        return;
    };
    let format = format.to_string();

    let mut flattened = match event.get(LOG_FLATTENED_KEY) {
        Some(LogValue::Map(existing)) => existing.clone(),
        _ => BTreeMap::new(),
    };

    for piece in parse_format(&format) {
        let Piece::Field(field) = piece else {
            continue;
        };
        if field.name.is_empty() {
            continue;
        }
        let rendered_key = field.rendered_key();
        if flattened.contains_key(&rendered_key) {
            continue;
        }
        let Some(value) = resolve_field(event, field.name) else {
            continue;
        };
        flattened.insert(
            rendered_key,
            LogValue::Text(render(value, field.is_repr())),
        );
        flattened.insert(field.key(""), value.clone());
    }

    if !flattened.is_empty() {
        event.insert(LOG_FLATTENED_KEY.to_string(), LogValue::Map(flattened));
    }
}

/// Renders an event's `log_format` message.
///
/// Flattened text is preferred over live field values, so events decoded
/// from a log render the way they did when written. Unresolvable references
/// render as `MISSING: <field>`. Events without a format render as `""`.
pub fn format_event(event: &LogEvent) -> String {
    let Some(format) = event.get(LOG_FORMAT_KEY).and_then(LogValue::as_str) else {
        return String::new();
    };
    let flattened = event.get(LOG_FLATTENED_KEY).and_then(LogValue::as_map);

    let mut out = String::new();
    for piece in parse_format(format) {
        match piece {
            Piece::Literal(text) => out.push_str(&text),
            Piece::Field(field) => {
                let stored = flattened
                    .and_then(|f| f.get(&field.rendered_key()))
                    .and_then(LogValue::as_str);
                match stored {
                    Some(text) => out.push_str(text),
                    None => match resolve_field(event, field.name) {
                        Some(value) => out.push_str(&render(value, field.is_repr())),
                        None => out.push_str(&format!("MISSING: {}", field.name)),
                    },
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{ErrorType, Failure};

    fn event(fields: Vec<(&str, LogValue)>) -> LogEvent {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn parses_conversion_and_spec() {
        assert_eq!(
            FieldRef::parse("count!r:>8"),
            FieldRef {
                name: "count",
                conversion: "r",
                spec: ">8"
            }
        );
        assert_eq!(
            FieldRef::parse("count:d"),
            FieldRef {
                name: "count",
                conversion: "",
                spec: "d"
            }
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        let pieces = parse_format("{{x}} {y}");
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], Piece::Literal("{x} ".to_string()));
    }

    #[test]
    fn flattens_referenced_fields() {
        let mut e = event(vec![
            ("log_format", "{user} from {peer.host}".into()),
            ("user", "alice".into()),
            (
                "peer",
                LogValue::Map(BTreeMap::from([(
                    "host".to_string(),
                    LogValue::from("10.0.0.1"),
                )])),
            ),
        ]);
        flatten_event(&mut e);
        let flattened = e[LOG_FLATTENED_KEY].as_map().unwrap();
        assert_eq!(flattened["user!s:"], LogValue::from("alice"));
        assert_eq!(flattened["user!:"], LogValue::from("alice"));
        assert_eq!(flattened["peer.host!s:"], LogValue::from("10.0.0.1"));
    }

    #[test]
    fn unresolved_reference_is_skipped() {
        let mut e = event(vec![("log_format", "{missing}".into())]);
        flatten_event(&mut e);
        assert!(!e.contains_key(LOG_FLATTENED_KEY));
    }

    #[test]
    fn event_without_format_is_untouched() {
        let mut e = event(vec![("text", "plain".into())]);
        let before = e.clone();
        flatten_event(&mut e);
        assert_eq!(e, before);
    }

    #[test]
    fn formats_with_indexes_and_repr() {
        let e = event(vec![
            ("log_format", "first={items[0]!r} level={lvl}".into()),
            ("items", LogValue::Array(vec!["a".into(), "b".into()])),
            ("lvl", crate::LogLevel::Warn.into()),
        ]);
        assert_eq!(format_event(&e), "first=\"a\" level=warn");
    }

    #[test]
    fn formats_missing_fields_inline() {
        let e = event(vec![("log_format", "value: {nope}".into())]);
        assert_eq!(format_event(&e), "value: MISSING: nope");
    }

    #[test]
    fn prefers_flattened_text() {
        let failure = Failure::new(ErrorType::new("app.errors", "BoomError"))
            .with_field("message", "boom");
        let mut e = event(vec![
            ("log_format", "failed: {why}".into()),
            ("why", failure.into()),
        ]);
        flatten_event(&mut e);
        e.insert("why".to_string(), LogValue::Null);
        assert_eq!(format_event(&e), "failed: app.errors.BoomError: boom");
    }
}
