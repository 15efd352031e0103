//! Error types for credential checks.

use thiserror::Error;

/// Errors returned by credential checkers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredError {
    /// Credentials were rejected or could not be checked.
    #[error("unauthorized login")]
    UnauthorizedLogin,
    /// No such user in the database.
    #[error("user not found: {}", String::from_utf8_lossy(.0))]
    UserNotFound(Vec<u8>),
}
