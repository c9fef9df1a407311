//! Scoped access to the store.

use crate::error::{ErrorKind, Result};
use frost_tree::{Credentials, Repository, SessionHandle};

/// A read-only session that is logged out when dropped.
///
/// Every node read through the view, including pretender nodes over its
/// frozen content, stops being readable once the view is gone.
#[derive(Debug)]
pub struct ReadOnlyView {
    session: SessionHandle,
}

impl ReadOnlyView {
    pub fn open(repository: &dyn Repository, credentials: &Credentials) -> Result<Self> {
        let session = repository.login(credentials).map_err(ErrorKind::login)?;
        tracing::debug!(user_id = %credentials.user_id, "Opened read-only view");
        Ok(Self { session })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }
}

impl Drop for ReadOnlyView {
    fn drop(&mut self) {
        self.session.logout();
        tracing::info!(user_id = %self.session.user_id(), "Released read-only view");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_tree::error::ErrorKind as TreeErrorKind;
    use frost_tree::mock::{MemoryRepository, NodeBuilder};
    use frost_tree::{Node, Session};

    #[test]
    fn test_drop_logs_out() {
        let repository = MemoryRepository::with_nodes([NodeBuilder::new("content", "nt:unstructured")]);
        let view = ReadOnlyView::open(&repository, &Credentials::new("previewuser", None)).unwrap();
        let node = view.session().node("/content").unwrap();
        assert_eq!(repository.open_sessions(), 1);
        drop(view);
        assert_eq!(repository.open_sessions(), 0);
        let err = node.name().unwrap_err();
        assert!(matches!(&*err, TreeErrorKind::SessionClosed));
    }

    #[test]
    fn test_rejected_login() {
        let repository = MemoryRepository::default().with_credentials(Credentials::new("admin", None));
        let err = ReadOnlyView::open(&repository, &Credentials::new("previewuser", None)).unwrap_err();
        assert_eq!(*err, ErrorKind::Login);
        assert!(!err.is_retryable());
        assert_eq!(repository.open_sessions(), 0);
    }
}
