use crate::credentials::{AvatarId, CredentialKind, Credentials};
use crate::error::CredError;
use crate::traits::CredentialsChecker;

/// Admits anonymous credentials as [`AvatarId::Anonymous`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAnonymousAccess;

impl CredentialsChecker for AllowAnonymousAccess {
    fn credential_kinds(&self) -> &'static [CredentialKind] {
        &[CredentialKind::Anonymous]
    }

    fn request_avatar_id(&self, _credentials: &Credentials) -> Result<AvatarId, CredError> {
        Ok(AvatarId::Anonymous)
    }
}
