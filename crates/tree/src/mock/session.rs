use super::node::MemoryNode;
use super::{HistoryData, SessionState, VersionData};
use crate::consts::{FROZEN_NODE_NAME, VERSIONABLE};
use crate::error::{ErrorKind, Result};
use crate::node::{Node, NodeHandle};
use crate::path::normalize;
use crate::session::Session;
use crate::version::{HistoryHandle, Version, VersionHandle, VersionHistory, VersionIter};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use time::UtcDateTime;

/// A session opened against a [`MemoryRepository`](super::MemoryRepository).
pub struct MemorySession {
    state: Arc<SessionState>,
}

impl MemorySession {
    pub(crate) fn new(state: Arc<SessionState>) -> Self {
        Self { state }
    }

    fn lookup(&self, path: &str) -> Result<Option<MemoryNode>> {
        self.state.check()?;
        let path = normalize(path)?;
        MemoryNode::lookup(&self.state, &path)
    }
}

impl fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySession")
            .field("user_id", &self.state.user_id)
            .field("live", &self.is_live())
            .finish()
    }
}

impl Session for MemorySession {
    fn user_id(&self) -> &str {
        &self.state.user_id
    }

    fn is_live(&self) -> bool {
        self.state.live.load(Ordering::SeqCst)
    }

    fn node_exists(&self, path: &str) -> Result<bool> {
        Ok(self.lookup(path)?.is_some())
    }

    fn node(&self, path: &str) -> Result<NodeHandle> {
        match self.lookup(path)? {
            Some(node) => Ok(Arc::new(node)),
            None => exn::bail!(ErrorKind::PathNotFound(path.to_string())),
        }
    }

    fn version_history(&self, path: &str) -> Result<Option<HistoryHandle>> {
        let Some(node) = self.lookup(path)? else {
            exn::bail!(ErrorKind::PathNotFound(path.to_string()));
        };
        if !node.is_node_type(VERSIONABLE)? {
            exn::bail!(ErrorKind::Unsupported(format!("not versionable: {path}")));
        }
        let path = node.path()?;
        Ok(self.state.histories.get(&path).map(|data| {
            Arc::new(MemoryHistory {
                data: data.clone(),
                state: self.state.clone(),
            }) as HistoryHandle
        }))
    }

    fn logout(&self) {
        if self.state.live.swap(false, Ordering::SeqCst) {
            self.state.open.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!(user_id = %self.state.user_id, "Closed in-memory session");
        }
    }
}

/// Version history read through a [`MemorySession`].
pub struct MemoryHistory {
    data: Arc<HistoryData>,
    state: Arc<SessionState>,
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("versionable_identifier", &self.data.versionable_identifier)
            .field("versions", &self.data.versions.len())
            .finish()
    }
}

impl VersionHistory for MemoryHistory {
    fn versionable_identifier(&self) -> Result<String> {
        self.state.check()?;
        Ok(self.data.versionable_identifier.clone())
    }

    fn linear_versions(&self) -> Result<VersionIter> {
        self.state.check()?;
        let versions: Vec<VersionHandle> = self
            .data
            .versions
            .iter()
            .map(|data| {
                Arc::new(MemoryVersion {
                    data: data.clone(),
                    state: self.state.clone(),
                }) as VersionHandle
            })
            .collect();
        Ok(VersionIter::from(versions))
    }
}

/// A version read through a [`MemorySession`].
pub struct MemoryVersion {
    data: Arc<VersionData>,
    state: Arc<SessionState>,
}

impl fmt::Debug for MemoryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryVersion")
            .field("path", &self.data.path)
            .field("created", &self.data.created)
            .finish()
    }
}

impl Version for MemoryVersion {
    fn name(&self) -> Result<String> {
        self.state.check()?;
        Ok(self.data.name.clone())
    }

    fn created(&self) -> Result<UtcDateTime> {
        self.state.check()?;
        Ok(self.data.created)
    }

    fn frozen_node(&self) -> Result<Option<NodeHandle>> {
        self.state.check()?;
        Ok(self.data.frozen.as_ref().map(|frozen| {
            let path = format!("{}/{FROZEN_NODE_NAME}", self.data.path);
            Arc::new(MemoryNode::detached(frozen.clone(), path, self.state.clone())) as NodeHandle
        }))
    }
}
