use crate::failure::Failure;
use crate::level::LogLevel;
use std::collections::BTreeMap;

/// A structured log event: field names mapped to values.
///
/// Events are produced upstream and handed to the codec as-is; the codec
/// never mutates the caller's event.
pub type LogEvent = BTreeMap<String, LogValue>;

/// A value stored in a log event field.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer that fits in `i64`.
    Int(i64),
    /// Floating point number. Non-finite values are not persistable.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Arbitrary bytes; encoded as one code point per byte and decoded as text.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    Array(Vec<LogValue>),
    /// Mapping with text keys.
    Map(BTreeMap<String, LogValue>),
    /// Mapping with arbitrary keys. Scalar keys are coerced to text when
    /// encoded, other keys are dropped; decodes as [`LogValue::Map`].
    Mapping(Vec<(LogValue, LogValue)>),
    /// Log level constant.
    Level(LogLevel),
    /// Captured error record.
    Failure(Failure),
    /// A value the producer could only describe by its type name.
    Opaque {
        /// Name of the value's type.
        type_name: String,
    },
}

impl LogValue {
    /// Wraps raw bytes.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        LogValue::Bytes(bytes.into())
    }

    /// Describes a value that has no structured representation.
    pub fn opaque(type_name: impl Into<String>) -> Self {
        LogValue::Opaque {
            type_name: type_name.into(),
        }
    }

    /// Returns the text if this is a [`LogValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping if this is a [`LogValue::Map`].
    pub fn as_map(&self) -> Option<&BTreeMap<String, LogValue>> {
        match self {
            LogValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the number as `f64` for `Int` and `Float` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LogValue::Int(i) => Some(*i as f64),
            LogValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Looks up a field of a `Map` value or of a failure's state.
    pub fn get(&self, key: &str) -> Option<&LogValue> {
        match self {
            LogValue::Map(map) => map.get(key),
            LogValue::Failure(failure) => failure.state.get(key),
            _ => None,
        }
    }

    /// Returns true for values handled by the type registry.
    pub fn is_special(&self) -> bool {
        matches!(self, LogValue::Level(_) | LogValue::Failure(_))
    }
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        LogValue::Text(value.to_string())
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        LogValue::Text(value)
    }
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        LogValue::Bool(value)
    }
}

impl From<i64> for LogValue {
    fn from(value: i64) -> Self {
        LogValue::Int(value)
    }
}

impl From<i32> for LogValue {
    fn from(value: i32) -> Self {
        LogValue::Int(value.into())
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        LogValue::Float(value)
    }
}

impl From<LogLevel> for LogValue {
    fn from(value: LogLevel) -> Self {
        LogValue::Level(value)
    }
}

impl From<Failure> for LogValue {
    fn from(value: Failure) -> Self {
        LogValue::Failure(value)
    }
}

impl From<Vec<LogValue>> for LogValue {
    fn from(value: Vec<LogValue>) -> Self {
        LogValue::Array(value)
    }
}

impl From<BTreeMap<String, LogValue>> for LogValue {
    fn from(value: BTreeMap<String, LogValue>) -> Self {
        LogValue::Map(value)
    }
}
