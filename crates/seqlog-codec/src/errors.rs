use thiserror::Error;

/// Errors that can occur while decoding an encoded event.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Record bytes are not valid UTF-8.
    #[error("invalid UTF-8 in record: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// Record text is not valid JSON (from serde_json).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Record text is valid JSON but not an object.
    #[error("record is not a JSON object")]
    NotAnObject,
    /// A tagged object carries a type tag the registry does not know.
    #[error("unknown type tag: {0}")]
    UnknownTypeTag(String),
    /// A tagged object is missing fields its kind requires.
    #[error("invalid {kind} value: {reason}")]
    InvalidSpecial {
        /// Name of the special kind being decoded.
        kind: &'static str,
        /// Reason for invalidity.
        reason: String,
    },
}
