use crate::errors::DecodeError;
use crate::failure::{ErrorType, Failure};
use crate::level::LogLevel;
use crate::value::LogValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Reserved object key holding the type tag of an encoded special value.
pub const TYPE_TAG_KEY: &str = "__class_uuid__";

/// Key of the marker object written in place of unpersistable values.
pub const UNPERSISTABLE_KEY: &str = "unpersistable";

const ERROR_TYPE_NAMESPACE_KEY: &str = "__module__";
const ERROR_TYPE_NAME_KEY: &str = "__name__";

/// Kinds of values that JSON cannot represent natively.
///
/// Each kind owns a type tag that is never reused or reassigned. The kinds
/// match disjoint [`LogValue`] variants, so no two predicates overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// [`LogValue::Level`], encoded as `{"name": ...}`.
    LogLevel,
    /// [`LogValue::Failure`], encoded as its state plus a `type` object.
    Failure,
}

impl SpecialKind {
    /// Returns the stable type tag of this kind.
    pub const fn tag(self) -> Uuid {
        match self {
            SpecialKind::LogLevel => Uuid::from_u128(0x02e59486_f24d_46ad_8224_3acdf2a5732a),
            SpecialKind::Failure => Uuid::from_u128(0xe76887e2_20ed_49bf_a8f8_ba25cc586f2d),
        }
    }

    /// Human-readable kind name used in errors.
    pub fn name(self) -> &'static str {
        match self {
            SpecialKind::LogLevel => "log level",
            SpecialKind::Failure => "failure",
        }
    }

    /// Returns true if `value` is of this kind.
    pub fn matches(self, value: &LogValue) -> bool {
        match self {
            SpecialKind::LogLevel => matches!(value, LogValue::Level(_)),
            SpecialKind::Failure => matches!(value, LogValue::Failure(_)),
        }
    }

    /// Encodes `value`'s fields, without the type tag.
    ///
    /// `encode_field` encodes nested values (failure state) so the caller can
    /// apply the full value encoder to them.
    fn encode_fields<F>(
        self,
        value: &LogValue,
        mut encode_field: F,
    ) -> Option<Map<String, Value>>
    where
        F: FnMut(&str, &LogValue) -> Value,
    {
        let mut fields = Map::new();
        match (self, value) {
            (SpecialKind::LogLevel, LogValue::Level(level)) => {
                fields.insert("name".to_string(), Value::String(level.name().to_string()));
            }
            (SpecialKind::Failure, LogValue::Failure(failure)) => {
                for (key, field) in &failure.state {
                    // Overwritten by the error type below.
                    if key == Failure::TYPE_FIELD {
                        continue;
                    }
                    fields.insert(key.clone(), encode_field(key, field));
                }
                let mut error_type = Map::new();
                error_type.insert(
                    ERROR_TYPE_NAMESPACE_KEY.to_string(),
                    Value::String(failure.error_type.namespace.clone()),
                );
                error_type.insert(
                    ERROR_TYPE_NAME_KEY.to_string(),
                    Value::String(failure.error_type.name.clone()),
                );
                fields.insert(Failure::TYPE_FIELD.to_string(), Value::Object(error_type));
            }
            _ => return None,
        }
        Some(fields)
    }

    /// Rebuilds a value of this kind from its decoded fields (tag removed).
    fn decode_fields(
        self,
        mut fields: BTreeMap<String, LogValue>,
    ) -> Result<LogValue, DecodeError> {
        match self {
            SpecialKind::LogLevel => match fields.get("name") {
                // Unknown names come from newer writers; the level is lost, not the record.
                Some(LogValue::Text(name)) => Ok(LogLevel::from_name(name)
                    .map(LogValue::Level)
                    .unwrap_or(LogValue::Null)),
                _ => Err(self.invalid("missing level name")),
            },
            SpecialKind::Failure => {
                let error_type = match fields.remove(Failure::TYPE_FIELD) {
                    Some(LogValue::Map(type_fields)) => {
                        let namespace = type_fields
                            .get(ERROR_TYPE_NAMESPACE_KEY)
                            .and_then(LogValue::as_str)
                            .ok_or_else(|| self.invalid("missing error type namespace"))?;
                        let name = type_fields
                            .get(ERROR_TYPE_NAME_KEY)
                            .and_then(LogValue::as_str)
                            .ok_or_else(|| self.invalid("missing error type name"))?;
                        ErrorType::new(namespace, name)
                    }
                    _ => return Err(self.invalid("missing error type")),
                };
                Ok(LogValue::Failure(Failure {
                    error_type,
                    state: fields,
                }))
            }
        }
    }

    fn invalid(self, reason: &str) -> DecodeError {
        DecodeError::InvalidSpecial {
            kind: self.name(),
            reason: reason.to_string(),
        }
    }
}

/// Ordered set of special kinds a codec understands.
///
/// The registry is fixed at construction and injected into
/// [`EventCodec`](crate::EventCodec); it is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    kinds: Vec<SpecialKind>,
}

impl TypeRegistry {
    /// Creates a registry probing `kinds` in the given order. Duplicates are ignored.
    pub fn new(kinds: impl IntoIterator<Item = SpecialKind>) -> Self {
        let mut unique = Vec::new();
        for kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Self { kinds: unique }
    }

    /// Registry with every built-in kind: log levels, then failures.
    pub fn standard() -> Self {
        Self::new([SpecialKind::LogLevel, SpecialKind::Failure])
    }

    /// Registry without special kinds; every special value becomes unpersistable.
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Registered kinds in classification order.
    pub fn kinds(&self) -> &[SpecialKind] {
        &self.kinds
    }

    /// Returns the first registered kind matching `value`.
    pub fn classify(&self, value: &LogValue) -> Option<SpecialKind> {
        self.kinds.iter().copied().find(|kind| kind.matches(value))
    }

    /// Returns the registered kind carrying `tag`.
    pub fn lookup(&self, tag: &Uuid) -> Option<SpecialKind> {
        self.kinds.iter().copied().find(|kind| kind.tag() == *tag)
    }

    /// Encodes `value` with the first matching kind and stamps the type tag.
    ///
    /// Returns `None` when no registered kind matches; the caller substitutes
    /// the unpersistable marker.
    pub fn classify_and_encode<F>(
        &self,
        value: &LogValue,
        encode_field: F,
    ) -> Option<(Uuid, Map<String, Value>)>
    where
        F: FnMut(&str, &LogValue) -> Value,
    {
        let kind = self.classify(value)?;
        let mut fields = kind.encode_fields(value, encode_field)?;
        let tag = kind.tag();
        fields.insert(
            TYPE_TAG_KEY.to_string(),
            Value::String(tag.hyphenated().to_string()),
        );
        Some((tag, fields))
    }

    /// Rebuilds a special value from its tag and remaining fields.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownTypeTag`] if `tag` is not a UUID of a
    /// registered kind, and [`DecodeError::InvalidSpecial`] if the fields do
    /// not describe a value of that kind.
    pub fn decode(
        &self,
        tag: &str,
        fields: BTreeMap<String, LogValue>,
    ) -> Result<LogValue, DecodeError> {
        let kind = Uuid::parse_str(tag)
            .ok()
            .and_then(|uuid| self.lookup(&uuid))
            .ok_or_else(|| DecodeError::UnknownTypeTag(tag.to_string()))?;
        kind.decode_fields(fields)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
