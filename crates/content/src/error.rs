//! Content Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Each variant names the step that failed; the store
//! error that caused it is kept underneath.

use derive_more::{Display, Error};
use frost_tree::error::ErrorKind as TreeErrorKind;

/// A content error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for content operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the step of a versioned lookup that failed.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The store rejected the configured credentials. Fix the configuration;
    /// retrying won't help.
    #[display("read-only view credentials rejected")]
    Login,
    /// The read-only view could not be opened.
    #[display("failed to open read-only view")]
    Session,
    /// The document could not be looked up by path.
    #[display("failed to look up document")]
    Lookup,
    /// The versionable node or its version history could not be read.
    #[display("failed to resolve version")]
    Resolve,
    /// The resolved version's content could not be presented as live.
    #[display("failed to read version content")]
    Decorate,
    /// The document could not be populated from its node.
    #[display("failed to map document")]
    Mapping,
}

impl ErrorKind {
    /// Wraps a failed login, keeping the store error as a child in the error
    /// tree.
    #[track_caller]
    pub fn login(err: frost_tree::error::Error) -> Error {
        let kind = match &*err {
            TreeErrorKind::Login(_) => Self::Login,
            _ => Self::Session,
        };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Session)
    }
}
