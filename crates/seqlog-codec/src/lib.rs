//! Structured log event encoding for seqlog.
//!
//! Events are flat mappings of field names to [`LogValue`]s. The codec turns
//! an event into one line of compact JSON and back again, including values
//! JSON cannot express natively:
//! - log levels and failures are tagged with a stable type UUID
//! - byte strings are stored as one code point per byte
//! - anything else is replaced with an `{"unpersistable": true}` marker
//!
//! ```rust
//! use seqlog_codec::{EventCodec, LogEvent, LogLevel, LogValue};
//!
//! let codec = EventCodec::default();
//! let mut event = LogEvent::new();
//! event.insert("log_level".into(), LogValue::Level(LogLevel::Warn));
//! event.insert("text".into(), "disk low".into());
//!
//! let encoded = codec.encode_event(&event);
//! assert!(!encoded.text.contains('\n'));
//! assert_eq!(codec.decode_event(&encoded.text)?, event);
//! # Ok::<(), seqlog_codec::DecodeError>(())
//! ```
#![deny(missing_docs)]

/// Event encoder and decoder.
pub mod codec;
/// Decode error types.
pub mod errors;
/// Failure (error record) values.
pub mod failure;
/// Format-string flattening and rendering.
pub mod flatten;
/// Log level enumeration.
pub mod level;
/// Type registry for values outside the JSON data model.
pub mod registry;
/// Encode reports for lossy substitutions.
pub mod report;
/// Event and value types.
pub mod value;

pub use codec::{CodecOptions, EncodedEvent, EventCodec, MAX_NESTING};
pub use errors::DecodeError;
pub use failure::{ErrorType, Failure};
pub use flatten::{flatten_event, format_event};
pub use level::{LogLevel, ParseLevelError};
pub use registry::{SpecialKind, TypeRegistry, TYPE_TAG_KEY, UNPERSISTABLE_KEY};
pub use report::{EncodeReport, EncodeStatus};
pub use value::{LogEvent, LogValue};
