//! Tree Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Every read against the content tree
//! reports through this type, including the decorator and resolver crates
//! layered on top of it, so a store failure reaches the caller unchanged.

use derive_more::{Display, Error};

/// A tree error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No node exists at the path
    #[display("path not found: {_0}")]
    PathNotFound(#[error(not(source))] String),
    /// Node exists but does not carry the property
    #[display("property not found: {_0}")]
    PropertyNotFound(#[error(not(source))] String),
    /// Path is malformed or escapes the root
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// Value cannot be converted to the requested type
    #[display("value format error: {_0}")]
    ValueFormat(#[error(not(source))] String),
    /// The caller handed over something the operation cannot accept, such as
    /// a live node where a frozen one is required. Don't retry.
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] String),
    /// The store does not support the operation on this item
    #[display("unsupported operation: {_0}")]
    Unsupported(#[error(not(source))] String),
    /// Credentials were rejected
    #[display("login failed for user: {_0}")]
    Login(#[error(not(source))] String),
    /// The session the item was read through has been released
    #[display("session is no longer live")]
    SessionClosed,
    /// The store could not complete the read
    #[display("backend error: {_0}")]
    Backend(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
