use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::DecodeError;
use crate::failure::Failure;
use crate::flatten::{flatten_event, LOG_FORMAT_KEY};
use crate::registry::{TypeRegistry, TYPE_TAG_KEY, UNPERSISTABLE_KEY};
use crate::report::EncodeReport;
use crate::value::{LogEvent, LogValue};

/// Deepest container nesting the encoder emits. Anything deeper becomes the
/// unpersistable marker, which keeps every record under the decoder's
/// recursion limit of 128.
pub const MAX_NESTING: usize = 100;

/// Options controlling how events are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// Flatten `log_format` references into `log_flattened` before encoding
    /// (default: true).
    pub flatten: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self { flatten: true }
    }
}

/// Result of encoding one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    /// Compact JSON text; never contains a line feed.
    pub text: String,
    /// Values that could not be encoded as-is.
    pub report: EncodeReport,
}

/// Field path used in encode reports.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        match segments.last_mut() {
            Some(last) => last.push_str(&format!("[{}]", index)),
            None => segments.push(format!("[{}]", index)),
        }
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Encodes log events to single-line JSON and decodes them back.
///
/// The codec is immutable after construction and can be shared between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct EventCodec {
    registry: TypeRegistry,
    options: CodecOptions,
}

impl EventCodec {
    /// Creates a codec for the provided registry with default options.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_options(registry, CodecOptions::default())
    }

    /// Creates a codec with explicit options.
    pub fn with_options(registry: TypeRegistry, options: CodecOptions) -> Self {
        Self { registry, options }
    }

    /// The registry used for special values.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Encodes an event to one line of compact JSON.
    ///
    /// Never fails: unrepresentable values are replaced by the
    /// `{"unpersistable": true}` marker and listed in the report.
    pub fn encode_event(&self, event: &LogEvent) -> EncodedEvent {
        let event: Cow<'_, LogEvent> =
            if self.options.flatten && event.contains_key(LOG_FORMAT_KEY) {
                let mut flattened = event.clone();
                flatten_event(&mut flattened);
                Cow::Owned(flattened)
            } else {
                Cow::Borrowed(event)
            };

        let mut report = EncodeReport::default();
        let mut object = Map::new();
        for (key, value) in event.iter() {
            let encoded = self.encode_at(value, &Path::root().push_field(key), 1, &mut report);
            object.insert(key.clone(), encoded);
        }

        // Compact serialization escapes control characters, so no raw LF survives.
        EncodedEvent {
            text: Value::Object(object).to_string(),
            report,
        }
    }

    /// Encodes a single value to its JSON form, discarding the report.
    pub fn encode_value(&self, value: &LogValue) -> Value {
        let mut report = EncodeReport::default();
        self.encode_at(value, &Path::root(), 0, &mut report)
    }

    /// Encodes `value` inside a container nested `depth` levels deep.
    fn encode_at(
        &self,
        value: &LogValue,
        path: &Path,
        depth: usize,
        report: &mut EncodeReport,
    ) -> Value {
        let nests = value.is_special()
            || matches!(
                value,
                LogValue::Array(_) | LogValue::Map(_) | LogValue::Mapping(_)
            );
        if nests && depth >= MAX_NESTING {
            return self.unpersistable(path, report);
        }

        match value {
            LogValue::Null => Value::Null,
            LogValue::Bool(b) => Value::Bool(*b),
            LogValue::Int(i) => Value::from(*i),
            LogValue::Float(f) => match Number::from_f64(*f) {
                Some(number) => Value::Number(number),
                None => self.unpersistable(path, report),
            },
            LogValue::Text(s) => Value::String(s.clone()),
            LogValue::Bytes(bytes) => Value::String(bytes_to_text(bytes)),
            LogValue::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.encode_at(item, &path.push_index(index), depth + 1, report)
                    })
                    .collect(),
            ),
            LogValue::Map(map) => {
                let mut object = Map::new();
                for (key, item) in map {
                    let encoded = self.encode_at(item, &path.push_field(key), depth + 1, report);
                    object.insert(key.clone(), encoded);
                }
                Value::Object(object)
            }
            LogValue::Mapping(pairs) => {
                let mut object = Map::new();
                for (key, item) in pairs {
                    // First occurrence wins when coerced keys collide.
                    match mapping_key(key) {
                        Some(key) if !object.contains_key(&key) => {
                            let encoded =
                                self.encode_at(item, &path.push_field(&key), depth + 1, report);
                            object.insert(key, encoded);
                        }
                        _ => report.dropped_keys.push(path.to_string()),
                    }
                }
                Value::Object(object)
            }
            LogValue::Level(_) | LogValue::Failure(_) | LogValue::Opaque { .. } => {
                self.encode_special(value, path, depth, report)
            }
        }
    }

    fn encode_special(
        &self,
        value: &LogValue,
        path: &Path,
        depth: usize,
        report: &mut EncodeReport,
    ) -> Value {
        if let LogValue::Failure(failure) = value {
            let classified = self.registry.classify(value).is_some();
            if classified && failure.state.contains_key(Failure::TYPE_FIELD) {
                report.dropped_keys.push(path.to_string());
            }
        }
        let encoded = self.registry.classify_and_encode(value, |key, field| {
            self.encode_at(field, &path.push_field(key), depth + 1, report)
        });
        match encoded {
            Some((_, fields)) => Value::Object(fields),
            None => self.unpersistable(path, report),
        }
    }

    fn unpersistable(&self, path: &Path, report: &mut EncodeReport) -> Value {
        tracing::debug!(path = %path, "replacing unpersistable value");
        report.unpersistable.push(path.to_string());
        let mut marker = Map::new();
        marker.insert(UNPERSISTABLE_KEY.to_string(), Value::Bool(true));
        Value::Object(marker)
    }

    /// Decodes one encoded event.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if:
    /// - the text is not valid JSON
    /// - the top-level value is not an object
    /// - a tagged object has an unknown tag or invalid fields
    pub fn decode_event(&self, text: &str) -> Result<LogEvent, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        match self.decode_value(value)? {
            LogValue::Map(event) => Ok(event),
            _ => Err(DecodeError::NotAnObject),
        }
    }

    /// Decodes one encoded event from UTF-8 bytes.
    pub fn decode_event_bytes(&self, bytes: &[u8]) -> Result<LogEvent, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        self.decode_event(text)
    }

    /// Rebuilds a value from its JSON form.
    ///
    /// Objects are rebuilt children first, so special values nested inside
    /// other special values are restored before their containers.
    pub fn decode_value(&self, value: Value) -> Result<LogValue, DecodeError> {
        match value {
            Value::Null => Ok(LogValue::Null),
            Value::Bool(b) => Ok(LogValue::Bool(b)),
            Value::Number(number) => Ok(match number.as_i64() {
                Some(i) => LogValue::Int(i),
                None => number.as_f64().map(LogValue::Float).unwrap_or(LogValue::Null),
            }),
            Value::String(s) => Ok(LogValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.decode_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(LogValue::Array),
            Value::Object(object) => {
                let mut fields = BTreeMap::new();
                for (key, item) in object {
                    fields.insert(key, self.decode_value(item)?);
                }
                match fields.remove(TYPE_TAG_KEY) {
                    None => Ok(LogValue::Map(fields)),
                    Some(LogValue::Text(tag)) => self.registry.decode(&tag, fields),
                    Some(other) => Err(DecodeError::UnknownTypeTag(format!("{:?}", other))),
                }
            }
        }
    }
}

/// Maps each byte to the code point of the same value (ISO-8859-1), so any
/// byte string becomes valid text without loss.
fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Text form of a mapping key, or `None` if the key must be dropped.
fn mapping_key(key: &LogValue) -> Option<String> {
    match key {
        LogValue::Text(s) => Some(s.clone()),
        LogValue::Int(i) => Some(i.to_string()),
        LogValue::Float(f) => Number::from_f64(*f).map(|n| n.to_string()),
        LogValue::Bool(b) => Some(b.to_string()),
        LogValue::Null => Some("null".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::ErrorType;
    use crate::level::LogLevel;
    use serde_json::json;

    fn event(fields: Vec<(&str, LogValue)>) -> LogEvent {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn bytes_become_latin1_text() {
        let codec = EventCodec::default();
        let encoded = codec.encode_value(&LogValue::bytes(vec![0x00, 0x41, 0xe9, 0xff]));
        assert_eq!(encoded, Value::String("\u{0}A\u{e9}\u{ff}".to_string()));
    }

    #[test]
    fn opaque_value_becomes_marker() {
        let codec = EventCodec::default();
        let encoded = codec.encode_event(&event(vec![
            ("socket", LogValue::opaque("TcpStream")),
            ("text", "ok".into()),
        ]));
        let value: Value = serde_json::from_str(&encoded.text).unwrap();
        assert_eq!(value["socket"], json!({"unpersistable": true}));
        assert_eq!(value["text"], "ok");
        assert_eq!(encoded.report.unpersistable, vec!["socket".to_string()]);
    }

    #[test]
    fn non_finite_float_becomes_marker() {
        let codec = EventCodec::default();
        let encoded = codec.encode_event(&event(vec![(
            "values",
            LogValue::Array(vec![1.5.into(), f64::NAN.into()]),
        )]));
        assert_eq!(encoded.text, r#"{"values":[1.5,{"unpersistable":true}]}"#);
        assert_eq!(encoded.report.unpersistable, vec!["values[1]".to_string()]);
    }

    #[test]
    fn empty_registry_makes_levels_unpersistable() {
        let codec = EventCodec::new(TypeRegistry::empty());
        let encoded = codec.encode_event(&event(vec![("log_level", LogLevel::Info.into())]));
        assert_eq!(encoded.text, r#"{"log_level":{"unpersistable":true}}"#);
    }

    #[test]
    fn scalar_mapping_keys_are_coerced_and_others_dropped() {
        let codec = EventCodec::default();
        let mapping = LogValue::Mapping(vec![
            (LogValue::Int(1), "one".into()),
            (LogValue::Bool(true), "yes".into()),
            (LogValue::Null, "nothing".into()),
            (LogValue::Array(vec![]), "dropped".into()),
            ("name".into(), "text".into()),
            ("1".into(), "collides".into()),
        ]);
        let encoded = codec.encode_event(&event(vec![("m", mapping)]));
        let value: Value = serde_json::from_str(&encoded.text).unwrap();
        assert_eq!(
            value["m"],
            json!({"1": "one", "true": "yes", "null": "nothing", "name": "text"})
        );
        assert_eq!(
            encoded.report.dropped_keys,
            vec!["m".to_string(), "m".to_string()]
        );
    }

    #[test]
    fn failure_type_state_key_is_reported_as_dropped() {
        let codec = EventCodec::default();
        let failure = Failure::new(ErrorType::new("app.errors", "BoomError"))
            .with_field("type", "user-type")
            .with_field("message", "boom");
        let encoded = codec.encode_event(&event(vec![("log_failure", failure.into())]));
        assert_eq!(encoded.report.dropped_keys, vec!["log_failure".to_string()]);
        assert!(!encoded.report.is_lossless());

        let value: Value = serde_json::from_str(&encoded.text).unwrap();
        assert_eq!(
            value["log_failure"]["type"],
            json!({"__module__": "app.errors", "__name__": "BoomError"})
        );
    }

    #[test]
    fn nesting_limit_applies_to_failure_state() {
        let codec = EventCodec::default();
        let mut deep = LogValue::Int(0);
        for _ in 0..MAX_NESTING {
            deep = LogValue::Array(vec![deep]);
        }
        let failure = Failure::new(ErrorType::new("app", "Deep")).with_field("value", deep);
        let encoded = codec.encode_event(&event(vec![("log_failure", failure.into())]));
        assert_eq!(encoded.report.unpersistable.len(), 1);
        assert!(codec.decode_event(&encoded.text).is_ok());
    }

    #[test]
    fn failure_state_is_encoded_recursively() {
        let codec = EventCodec::default();
        let failure = Failure::new(ErrorType::new("app.errors", "BoomError"))
            .with_field("message", "boom")
            .with_field("raw", LogValue::bytes(b"\xff".to_vec()))
            .with_field("handle", LogValue::opaque("Frame"));
        let encoded = codec.encode_event(&event(vec![("log_failure", failure.into())]));
        let value: Value = serde_json::from_str(&encoded.text).unwrap();
        let failure = &value["log_failure"];
        assert_eq!(failure["message"], "boom");
        assert_eq!(failure["raw"], "\u{ff}");
        assert_eq!(failure["handle"], json!({"unpersistable": true}));
        assert_eq!(
            failure["type"],
            json!({"__module__": "app.errors", "__name__": "BoomError"})
        );
        assert_eq!(failure[TYPE_TAG_KEY], "e76887e2-20ed-49bf-a8f8-ba25cc586f2d");
        assert_eq!(encoded.report.unpersistable, vec!["log_failure.handle".to_string()]);
    }

    #[test]
    fn integers_and_floats_are_distinguished() {
        let codec = EventCodec::default();
        let decoded = codec.decode_event(r#"{"a":3,"b":3.5,"c":18446744073709551615}"#).unwrap();
        assert_eq!(decoded["a"], LogValue::Int(3));
        assert_eq!(decoded["b"], LogValue::Float(3.5));
        assert_eq!(decoded["c"], LogValue::Float(18446744073709551615.0));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let codec = EventCodec::default();
        assert!(matches!(codec.decode_event("[1,2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(codec.decode_event("{\"a\":"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn non_text_tag_is_unknown() {
        let codec = EventCodec::default();
        let err = codec
            .decode_event(r#"{"x":{"__class_uuid__":7}}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnknownTypeTag(_)));
    }

    #[test]
    fn invalid_utf8_bytes_are_rejected() {
        let codec = EventCodec::default();
        assert!(matches!(
            codec.decode_event_bytes(b"{\"a\":\"\xff\"}"),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }
}
