//! Password file checker.
//!
//! The file holds one user per line, fields separated by a delimiter:
//!
//! ```text
//! alice:secret
//! bob:hunter2:extra fields are ignored
//! ```

use crate::credentials::{AvatarId, CredentialKind, Credentials};
use crate::error::CredError;
use crate::traits::CredentialsChecker;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

/// Hashes a presented password for comparison with the stored value.
///
/// Called as `hash(username, password, stored)`; the stored value is passed
/// so salted schemes can extract their salt from it.
pub type HashFn = fn(&[u8], &[u8], &[u8]) -> Vec<u8>;

/// Options for [`FilePasswordDb`].
#[derive(Debug, Clone)]
pub struct FilePasswordDbOptions {
    /// Field delimiter (default: `:`).
    pub delimiter: Vec<u8>,
    /// Index of the username field (default: 0).
    pub username_field: usize,
    /// Index of the password field (default: 1).
    pub password_field: usize,
    /// Whether usernames are case sensitive (default: true).
    pub case_sensitive: bool,
    /// Whether to keep parsed users in memory between lookups (default: false).
    pub cache: bool,
}

impl Default for FilePasswordDbOptions {
    fn default() -> Self {
        Self {
            delimiter: b":".to_vec(),
            username_field: 0,
            password_field: 1,
            case_sensitive: true,
            cache: false,
        }
    }
}

#[derive(Debug)]
struct CachedUsers {
    modified: SystemTime,
    users: HashMap<Vec<u8>, Vec<u8>>,
}

/// Checks credentials against a delimited password file.
///
/// The file is read on every lookup unless caching is enabled, in which case
/// it is re-read only when its modification time moves past the cached one.
/// Caching is best-effort: a change within the filesystem's timestamp
/// resolution can go unnoticed.
#[derive(Debug)]
pub struct FilePasswordDb {
    path: PathBuf,
    options: FilePasswordDbOptions,
    hash: Option<HashFn>,
    cache: Mutex<Option<CachedUsers>>,
}

impl FilePasswordDb {
    /// Creates a checker for the password file at `path`.
    ///
    /// The file is not read until the first lookup.
    pub fn new<P: AsRef<Path>>(path: P, options: FilePasswordDbOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            hash: None,
            cache: Mutex::new(None),
        }
    }

    /// Stores hashed passwords: presented passwords are hashed before
    /// comparison, and only cleartext credentials are accepted.
    pub fn with_hash(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Path of the password file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a user.
    ///
    /// Returns the username as stored (lower-cased for case-insensitive
    /// databases) and the stored password.
    ///
    /// # Errors
    ///
    /// - [`CredError::UserNotFound`] if no line names the user
    /// - [`CredError::UnauthorizedLogin`] if the file cannot be read
    pub fn get_user(&self, username: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CredError> {
        let username = self.normalize(username);

        let found = if self.options.cache {
            let mut cache = self.lock_cache();
            self.refresh_cache(&mut cache)?;
            cache
                .as_ref()
                .and_then(|cached| cached.users.get(&username))
                .cloned()
        } else {
            self.load_credentials()?
                .into_iter()
                .find(|(name, _)| *name == username)
                .map(|(_, password)| password)
        };

        match found {
            Some(password) => Ok((username, password)),
            None => Err(CredError::UserNotFound(username)),
        }
    }

    fn normalize(&self, username: &[u8]) -> Vec<u8> {
        if self.options.case_sensitive {
            username.to_vec()
        } else {
            username.to_ascii_lowercase()
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<CachedUsers>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refresh_cache(&self, cache: &mut Option<CachedUsers>) -> Result<(), CredError> {
        let modified = self.modified().map_err(|e| self.load_failed(e))?;
        let stale = match cache {
            Some(cached) => modified > cached.modified,
            None => true,
        };
        if stale {
            let mut users = HashMap::new();
            for (name, password) in self.load_credentials()? {
                users.entry(name).or_insert(password);
            }
            tracing::debug!(path = %self.path.display(), users = users.len(), "loaded credentials");
            *cache = Some(CachedUsers { modified, users });
        }
        Ok(())
    }

    fn modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }

    /// Parses the file into `(username, password)` pairs in file order.
    fn load_credentials(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, CredError> {
        let contents = fs::read(&self.path).map_err(|e| self.load_failed(e))?;
        let needed = self.options.username_field.max(self.options.password_field);

        let mut credentials = Vec::new();
        for line in contents.split(|&b| b == b'\n') {
            let parts = split_fields(trim_end(line), &self.options.delimiter);
            if parts.len() <= needed {
                continue;
            }
            let username = self.normalize(parts[self.options.username_field]);
            let password = parts[self.options.password_field].to_vec();
            credentials.push((username, password));
        }
        Ok(credentials)
    }

    fn load_failed(&self, error: io::Error) -> CredError {
        tracing::error!(path = %self.path.display(), %error, "Unable to load credentials db");
        CredError::UnauthorizedLogin
    }
}

impl CredentialsChecker for FilePasswordDb {
    fn credential_kinds(&self) -> &'static [CredentialKind] {
        if self.hash.is_some() {
            &[CredentialKind::UsernamePassword]
        } else {
            &[
                CredentialKind::UsernamePassword,
                CredentialKind::UsernameHashedPassword,
            ]
        }
    }

    fn request_avatar_id(&self, credentials: &Credentials) -> Result<AvatarId, CredError> {
        let username = credentials.username().ok_or(CredError::UnauthorizedLogin)?;
        let (name, stored) = match self.get_user(username) {
            Ok(found) => found,
            Err(CredError::UserNotFound(_)) => return Err(CredError::UnauthorizedLogin),
            Err(e) => return Err(e),
        };

        let matched = match (self.hash, credentials) {
            (Some(hash), Credentials::UsernamePassword { username, password }) => {
                hash(username, password, &stored) == stored
            }
            (Some(_), _) => false,
            (None, credentials) => credentials.check_password(&stored),
        };

        if matched {
            Ok(AvatarId::User(name))
        } else {
            Err(CredError::UnauthorizedLogin)
        }
    }
}

fn trim_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    &line[..end]
}

fn split_fields<'a>(line: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    if delimiter.is_empty() {
        return vec![line];
    }
    let mut fields = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while index + delimiter.len() <= line.len() {
        if &line[index..index + delimiter.len()] == delimiter {
            fields.push(&line[start..index]);
            index += delimiter.len();
            start = index;
        } else {
            index += 1;
        }
    }
    fields.push(&line[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_multibyte_delimiter() {
        assert_eq!(
            split_fields(b"a::b::", b"::"),
            vec![&b"a"[..], &b"b"[..], &b""[..]]
        );
        assert_eq!(split_fields(b"abc", b":"), vec![&b"abc"[..]]);
    }

    #[test]
    fn trims_trailing_whitespace() {
        assert_eq!(trim_end(b"alice:secret \r"), b"alice:secret");
        assert_eq!(trim_end(b"   "), b"");
    }
}
