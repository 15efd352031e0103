//! Credential checkers.
//!
//! This crate provides:
//! - [`Credentials`] presented by a client and the [`AvatarId`] a checker
//!   resolves them to
//! - the [`CredentialsChecker`] trait
//! - checkers that allow anonymous access, keep users in memory, or read a
//!   delimited password file
//!
//! ```rust
//! use seqlog_cred::{AvatarId, Credentials, CredentialsChecker, InMemoryPasswordDb};
//!
//! let mut db = InMemoryPasswordDb::new();
//! db.add_user("alice", "secret");
//!
//! let avatar = db.request_avatar_id(&Credentials::username_password("alice", "secret"))?;
//! assert_eq!(avatar, AvatarId::User(b"alice".to_vec()));
//! # Ok::<(), seqlog_cred::CredError>(())
//! ```

#![deny(missing_docs)]

/// Checker that admits everyone anonymously.
pub mod anonymous;
/// Credential and avatar types.
pub mod credentials;
/// Error types for credential checks.
pub mod error;
/// Password file checker.
pub mod file;
/// In-memory password checker.
pub mod memory;
/// Credential checker trait.
pub mod traits;

pub use anonymous::AllowAnonymousAccess;
pub use credentials::{AvatarId, CredentialKind, Credentials};
pub use error::CredError;
pub use file::{FilePasswordDb, FilePasswordDbOptions, HashFn};
pub use memory::InMemoryPasswordDb;
pub use traits::CredentialsChecker;
