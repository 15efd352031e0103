//! Credential and avatar types.

use std::fmt;

/// Kind of credentials a checker can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// No credentials at all.
    Anonymous,
    /// Username and cleartext password.
    UsernamePassword,
    /// Username and a password already hashed by the client.
    UsernameHashedPassword,
}

/// Credentials presented by a client.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No credentials.
    Anonymous,
    /// Username and cleartext password.
    UsernamePassword {
        /// Username bytes.
        username: Vec<u8>,
        /// Password bytes.
        password: Vec<u8>,
    },
    /// Username and hashed password.
    UsernameHashedPassword {
        /// Username bytes.
        username: Vec<u8>,
        /// Hashed password bytes.
        hashed: Vec<u8>,
    },
}

impl Credentials {
    /// Username and cleartext password credentials.
    pub fn username_password(username: impl Into<Vec<u8>>, password: impl Into<Vec<u8>>) -> Self {
        Credentials::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username and hashed password credentials.
    pub fn username_hashed_password(
        username: impl Into<Vec<u8>>,
        hashed: impl Into<Vec<u8>>,
    ) -> Self {
        Credentials::UsernameHashedPassword {
            username: username.into(),
            hashed: hashed.into(),
        }
    }

    /// Kind of these credentials.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credentials::Anonymous => CredentialKind::Anonymous,
            Credentials::UsernamePassword { .. } => CredentialKind::UsernamePassword,
            Credentials::UsernameHashedPassword { .. } => CredentialKind::UsernameHashedPassword,
        }
    }

    /// Username, if these credentials carry one.
    pub fn username(&self) -> Option<&[u8]> {
        match self {
            Credentials::Anonymous => None,
            Credentials::UsernamePassword { username, .. }
            | Credentials::UsernameHashedPassword { username, .. } => Some(username),
        }
    }

    /// Compares the presented secret with `stored`.
    ///
    /// Anonymous credentials never match.
    pub fn check_password(&self, stored: &[u8]) -> bool {
        match self {
            Credentials::Anonymous => false,
            Credentials::UsernamePassword { password, .. } => password.as_slice() == stored,
            Credentials::UsernameHashedPassword { hashed, .. } => hashed.as_slice() == stored,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", &String::from_utf8_lossy(username))
                .finish_non_exhaustive(),
            Credentials::UsernameHashedPassword { username, .. } => f
                .debug_struct("UsernameHashedPassword")
                .field("username", &String::from_utf8_lossy(username))
                .finish_non_exhaustive(),
        }
    }
}

/// Identity a checker resolved credentials to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AvatarId {
    /// The anonymous avatar.
    Anonymous,
    /// A named user.
    User(Vec<u8>),
}

impl fmt::Display for AvatarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvatarId::Anonymous => write!(f, "<anonymous>"),
            AvatarId::User(name) => write!(f, "{}", String::from_utf8_lossy(name)),
        }
    }
}
