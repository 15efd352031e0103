/// Whether an encoded event kept every field intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStatus {
    /// Every value was encoded.
    Ok,
    /// Some values were replaced by the unpersistable marker or dropped.
    Lossy,
}

/// Substitutions made while encoding one event.
///
/// Encoding never fails; anything that could not be represented is listed
/// here by field path (e.g. `payload.items[2]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Paths of values replaced by `{"unpersistable": true}`.
    pub unpersistable: Vec<String>,
    /// Paths of mappings and failures that had keys dropped, one entry per
    /// dropped key.
    pub dropped_keys: Vec<String>,
}

impl EncodeReport {
    /// Overall status of the encode.
    pub fn status(&self) -> EncodeStatus {
        if self.is_lossless() {
            EncodeStatus::Ok
        } else {
            EncodeStatus::Lossy
        }
    }

    /// True when nothing was substituted or dropped.
    pub fn is_lossless(&self) -> bool {
        self.unpersistable.is_empty() && self.dropped_keys.is_empty()
    }
}
