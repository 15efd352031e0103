use thiserror::Error;

/// Errors that can occur while reading or writing an event log.
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Record text that cannot be framed.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
