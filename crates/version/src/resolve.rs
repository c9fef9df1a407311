use frost_tree::consts::{HANDLE, LIVE, PUBLISHABLE, STATE, STATE_SUMMARY, UNPUBLISHED, VERSIONABLE};
use frost_tree::error::Result;
use frost_tree::{Node, NodeHandle, Version, VersionHandle};
use time::UtcDateTime;
use tracing::instrument;

/// Outcome of resolving a version.
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(VersionHandle),
    /// Nothing in the history qualifies. Not an error.
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn version(&self) -> Option<&VersionHandle> {
        match self {
            Self::Found(version) => Some(version),
            Self::NotFound => None,
        }
    }

    pub fn into_version(self) -> Option<VersionHandle> {
        match self {
            Self::Found(version) => Some(version),
            Self::NotFound => None,
        }
    }
}

impl From<Option<VersionHandle>> for Resolution {
    fn from(version: Option<VersionHandle>) -> Self {
        match version {
            Some(version) => Self::Found(version),
            None => Self::NotFound,
        }
    }
}

/// Finds the node whose version history should be queried for a document.
///
/// For a handle, that is the first same-named variant that is publishable and
/// in the `unpublished` state (the working copy). A variant without a state
/// does not qualify. Any other node is its own versionable node if it is
/// `mix:versionable`. Returns `None` when nothing qualifies.
#[instrument(skip_all)]
pub fn find_versionable_node(handle: &NodeHandle) -> Result<Option<NodeHandle>> {
    if !handle.is_node_type(HANDLE)? {
        return match handle.is_node_type(VERSIONABLE)? {
            true => Ok(Some(handle.clone())),
            false => Ok(None),
        };
    }
    let name = handle.name()?;
    for variant in handle.nodes()?.present() {
        if variant.name()? != name || !variant.is_node_type(PUBLISHABLE)? {
            continue;
        }
        if variant.string_property(STATE)?.as_deref() == Some(UNPUBLISHED) {
            let index = variant.index()?;
            tracing::trace!(index, "Found versionable variant");
            return Ok(Some(variant));
        }
    }
    Ok(None)
}

/// Every version along the linear history of `node`, in store order.
///
/// A node without a stored history yields an empty list.
pub fn all_linear_versions(node: &dyn Node) -> Result<Vec<VersionHandle>> {
    let session = node.session()?;
    match session.version_history(&node.path()?)? {
        Some(history) => Ok(history.linear_versions()?.collect()),
        None => Ok(Vec::new()),
    }
}

/// The marker version created when versioning was first enabled.
pub fn root_version(versions: &[VersionHandle]) -> Result<Option<VersionHandle>> {
    for version in versions {
        if version.is_root()? {
            return Ok(Some(version.clone()));
        }
    }
    Ok(None)
}

/// Whether the version captured a complete, publishable save.
///
/// That is the case when its frozen node carries a `hippostd:stateSummary` of
/// `live`. Versions without a frozen node or without the summary do not.
pub fn has_live_frozen_node(version: &dyn Version) -> Result<bool> {
    let Some(frozen) = version.frozen_node()? else {
        return Ok(false);
    };
    Ok(frozen.string_property(STATE_SUMMARY)?.as_deref() == Some(LIVE))
}

/// Picks the version in effect at `as_of`.
///
/// Without an instant this is the root version, when the history has one.
/// The root version is the baseline, not the newest check-in; callers decide
/// what it stands for.
///
/// With an instant, the latest live version created no later than `as_of`.
/// Versions are expected in non-decreasing order of creation, so the scan
/// stops at the first live version created after `as_of`. Versions that are
/// not live are skipped whatever their timestamp.
#[instrument(skip_all, fields(versions = versions.len(), as_of = ?as_of))]
pub fn version_as_of(versions: &[VersionHandle], as_of: Option<UtcDateTime>) -> Result<Option<VersionHandle>> {
    let Some(as_of) = as_of else {
        return root_version(versions);
    };
    let mut best = None;
    for version in versions {
        let name = version.name()?;
        if !has_live_frozen_node(&**version)? {
            tracing::debug!(version = %name, "Skipping version that is not live");
            continue;
        }
        if version.created()? > as_of {
            break;
        }
        tracing::trace!(version = %name, "Version was in effect");
        best = Some(version.clone());
    }
    Ok(best)
}

/// Reads the history of `node` and picks the version in effect at `as_of`.
pub fn resolve(node: &dyn Node, as_of: Option<UtcDateTime>) -> Result<Option<VersionHandle>> {
    version_as_of(&all_linear_versions(node)?, as_of)
}

/// Like [`resolve()`], with the outcome spelled out.
pub fn resolve_outcome(node: &dyn Node, as_of: Option<UtcDateTime>) -> Result<Resolution> {
    resolve(node, as_of).map(Resolution::from)
}
