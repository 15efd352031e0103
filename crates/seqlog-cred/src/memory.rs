use crate::credentials::{AvatarId, CredentialKind, Credentials};
use crate::error::CredError;
use crate::traits::CredentialsChecker;
use std::collections::HashMap;

/// Username/password database held in memory.
///
/// Passwords are stored in cleartext; intended for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPasswordDb {
    users: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryPasswordDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database holding `users` as `(username, password)` pairs.
    pub fn with_users<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<Vec<u8>>,
        P: Into<Vec<u8>>,
    {
        let mut db = Self::new();
        for (username, password) in users {
            db.add_user(username, password);
        }
        db
    }

    /// Adds or replaces a user.
    pub fn add_user(&mut self, username: impl Into<Vec<u8>>, password: impl Into<Vec<u8>>) {
        self.users.insert(username.into(), password.into());
    }
}

impl CredentialsChecker for InMemoryPasswordDb {
    fn credential_kinds(&self) -> &'static [CredentialKind] {
        &[
            CredentialKind::UsernamePassword,
            CredentialKind::UsernameHashedPassword,
        ]
    }

    fn request_avatar_id(&self, credentials: &Credentials) -> Result<AvatarId, CredError> {
        let username = credentials.username().ok_or(CredError::UnauthorizedLogin)?;
        match self.users.get(username) {
            Some(stored) if credentials.check_password(stored) => {
                Ok(AvatarId::User(username.to_vec()))
            }
            _ => Err(CredError::UnauthorizedLogin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_user() {
        let db = InMemoryPasswordDb::with_users([("alice", "secret"), ("bob", "hunter2")]);
        let avatar = db
            .request_avatar_id(&Credentials::username_password("bob", "hunter2"))
            .unwrap();
        assert_eq!(avatar, AvatarId::User(b"bob".to_vec()));
    }

    #[test]
    fn rejects_wrong_password_and_unknown_user() {
        let db = InMemoryPasswordDb::with_users([("alice", "secret")]);
        assert!(matches!(
            db.request_avatar_id(&Credentials::username_password("alice", "nope")),
            Err(CredError::UnauthorizedLogin)
        ));
        assert!(matches!(
            db.request_avatar_id(&Credentials::username_password("carol", "secret")),
            Err(CredError::UnauthorizedLogin)
        ));
        assert!(matches!(
            db.request_avatar_id(&Credentials::Anonymous),
            Err(CredError::UnauthorizedLogin)
        ));
    }

    #[test]
    fn hashed_credentials_compare_directly() {
        let mut db = InMemoryPasswordDb::new();
        db.add_user("alice", "digest");
        assert!(db
            .request_avatar_id(&Credentials::username_hashed_password("alice", "digest"))
            .is_ok());
    }
}
