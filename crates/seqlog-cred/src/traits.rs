//! Credential checker trait.

use crate::credentials::{AvatarId, CredentialKind, Credentials};
use crate::error::CredError;

/// Resolves presented credentials to an avatar identifier.
pub trait CredentialsChecker {
    /// Credential kinds this checker accepts.
    fn credential_kinds(&self) -> &'static [CredentialKind];

    /// Checks `credentials` and returns the avatar they identify.
    ///
    /// Unsupported credential kinds, unknown users and wrong secrets all
    /// yield [`CredError::UnauthorizedLogin`].
    fn request_avatar_id(&self, credentials: &Credentials) -> Result<AvatarId, CredError>;

    /// True if this checker accepts the kind of `credentials`.
    fn accepts(&self, credentials: &Credentials) -> bool {
        self.credential_kinds().contains(&credentials.kind())
    }
}
