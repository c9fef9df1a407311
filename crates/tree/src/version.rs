//! Versions and version histories.

use crate::consts::ROOT_VERSION;
use crate::error::Result;
use crate::node::NodeHandle;
use std::fmt::Debug;
use std::sync::Arc;
use time::UtcDateTime;

pub type VersionHandle = Arc<dyn Version>;
pub type HistoryHandle = Arc<dyn VersionHistory>;

/// One checked-in state of a versionable node.
pub trait Version: Send + Sync + Debug {
    fn name(&self) -> Result<String>;

    /// When the version was checked in.
    fn created(&self) -> Result<UtcDateTime>;

    /// The frozen copy of the node's content at check-in time.
    fn frozen_node(&self) -> Result<Option<NodeHandle>>;

    /// Whether this is the marker version created when versioning was first
    /// enabled, rather than a real check-in.
    fn is_root(&self) -> Result<bool> {
        Ok(self.name()? == ROOT_VERSION)
    }
}

/// All versions of one versionable node.
pub trait VersionHistory: Send + Sync + Debug {
    /// Identifier of the node the history belongs to.
    fn versionable_identifier(&self) -> Result<String>;

    /// Versions along the single linear line of the history, in the order
    /// the store keeps them (oldest first).
    fn linear_versions(&self) -> Result<VersionIter>;
}

/// Versions returned by [`VersionHistory::linear_versions`].
pub struct VersionIter {
    inner: Box<dyn Iterator<Item = VersionHandle> + Send>,
    remaining: Option<usize>,
}

impl VersionIter {
    /// Wraps a lazily evaluated sequence of unknown length.
    pub fn new(iter: impl Iterator<Item = VersionHandle> + Send + 'static) -> Self {
        Self {
            inner: Box::new(iter),
            remaining: None,
        }
    }

    /// Number of versions left, when known.
    pub fn size(&self) -> Option<usize> {
        self.remaining
    }
}

impl From<Vec<VersionHandle>> for VersionIter {
    fn from(versions: Vec<VersionHandle>) -> Self {
        Self {
            remaining: Some(versions.len()),
            inner: Box::new(versions.into_iter()),
        }
    }
}

impl Iterator for VersionIter {
    type Item = VersionHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next();
        if next.is_some() {
            self.remaining = self.remaining.map(|r| r.saturating_sub(1));
        }
        next
    }
}

impl Debug for VersionIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionIter").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}
