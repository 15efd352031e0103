use crate::value::LogValue;
use std::collections::BTreeMap;
use std::fmt;

/// Classification of the error a [`Failure`] was captured from.
///
/// Decoding never needs the original error type to exist: the namespace and
/// name strings are carried as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorType {
    /// Module or namespace the error type was defined in (e.g. `app.errors`).
    pub namespace: String,
    /// Name of the error type (e.g. `BoomError`).
    pub name: String,
}

impl ErrorType {
    /// Creates an error type descriptor.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Returns `namespace.name`, or just `name` when the namespace is empty.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// A captured error record.
///
/// `state` is opaque to the codec (message, traceback text, cause chain...).
/// The state key `type` is reserved: the encoder writes the error type there.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Type of the original error.
    pub error_type: ErrorType,
    /// Captured state of the error.
    pub state: BTreeMap<String, LogValue>,
}

impl Failure {
    /// Key under which the error type is encoded.
    pub const TYPE_FIELD: &'static str = "type";

    /// Creates a failure with empty state.
    pub fn new(error_type: ErrorType) -> Self {
        Self {
            error_type,
            state: BTreeMap::new(),
        }
    }

    /// Adds one state field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<LogValue>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    /// Returns the `message` state field when it is text.
    pub fn message(&self) -> Option<&str> {
        self.state.get("message").and_then(LogValue::as_str)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.error_type, message),
            None => write!(f, "{}", self.error_type),
        }
    }
}
