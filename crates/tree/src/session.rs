//! Sessions (views onto the store) and the repository that opens them.

use crate::error::Result;
use crate::node::NodeHandle;
use crate::version::HistoryHandle;
use std::fmt;
use std::sync::Arc;

pub type SessionHandle = Arc<dyn Session>;
pub type RepositoryHandle = Arc<dyn Repository>;

/// A view onto the content tree opened with a set of credentials.
///
/// Nodes read through a session are only valid while it is live. Once
/// [`logout()`](Self::logout) has been called, every read through the session
/// or any node obtained from it fails with
/// [`SessionClosed`](crate::error::ErrorKind::SessionClosed).
pub trait Session: Send + Sync + fmt::Debug {
    fn user_id(&self) -> &str;

    fn is_live(&self) -> bool;

    fn node_exists(&self, path: &str) -> Result<bool>;

    /// Returns [`PathNotFound`](crate::error::ErrorKind::PathNotFound) if no
    /// node exists at the absolute path.
    fn node(&self, path: &str) -> Result<NodeHandle>;

    /// History of the versionable node at the absolute path, or `None` when
    /// the store keeps none for it. Returns
    /// [`Unsupported`](crate::error::ErrorKind::Unsupported) if the node is
    /// not versionable.
    fn version_history(&self, path: &str) -> Result<Option<HistoryHandle>>;

    /// Releases the session. Calling it again has no effect.
    fn logout(&self);
}

/// The store itself: the thing sessions are opened against.
pub trait Repository: Send + Sync {
    /// Opens a session. Returns [`Login`](crate::error::ErrorKind::Login) if
    /// the credentials are rejected.
    fn login(&self, credentials: &Credentials) -> Result<SessionHandle>;
}

/// Credentials used to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<Option<String>>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
