use crate::document::{Document, map_node};
use crate::error::{ErrorKind, Result};
use crate::mapper::{MapperHandle, RequestContextHandle};
use crate::view::ReadOnlyView;
use exn::{OptionExt, ResultExt};
use frost_config::Config;
use frost_pretend::pretend;
use frost_tree::{Credentials, NodeHandle, RepositoryHandle, Session, Version};
use frost_version::{all_linear_versions, find_versionable_node, version_as_of};
use time::UtcDateTime;
use tracing::instrument;

/// Reads documents as they were at a given instant.
///
/// Each lookup opens its own read-only view with the configured credentials
/// and releases it before returning. Nothing is cached between lookups.
pub struct VersionedContent {
    repository: RepositoryHandle,
    credentials: Credentials,
    mapper: MapperHandle,
    context: Option<RequestContextHandle>,
}

impl VersionedContent {
    /// `mapper` is used unless a request context supplies one.
    pub fn new(repository: RepositoryHandle, credentials: Credentials, mapper: MapperHandle) -> Self {
        Self {
            repository,
            credentials,
            mapper,
            context: None,
        }
    }

    pub fn from_config(repository: RepositoryHandle, config: &Config, mapper: MapperHandle) -> Self {
        Self::new(repository, config.credentials(), mapper)
    }

    pub fn with_request_context(mut self, context: RequestContextHandle) -> Self {
        self.context = Some(context);
        self
    }

    /// The document at `path` as it currently stands in the version history.
    pub fn versioned_value_latest<D: Document>(&self, path: &str) -> Option<D> {
        self.versioned_value(path, None)
    }

    /// The document at `path` as it was at `as_of`.
    ///
    /// Returns `None` when the path does not exist, the document is not
    /// versioned, no version was in effect at `as_of`, or the mapper has no
    /// document type bound to the node's real type. Failures are
    /// logged and also return `None`; use
    /// [`try_versioned_value()`](Self::try_versioned_value) to receive them.
    pub fn versioned_value<D: Document>(&self, path: &str, as_of: Option<UtcDateTime>) -> Option<D> {
        match self.try_versioned_value(path, as_of) {
            Ok(document) => document,
            Err(err) => {
                tracing::error!(path, error = ?err, "Failed to retrieve versioned document");
                None
            },
        }
    }

    /// Like [`versioned_value()`](Self::versioned_value), returning failures.
    ///
    /// Without `as_of`, the version history resolves to its root version,
    /// which stands for "nothing checked in to go back to" and yields the
    /// current document. With `as_of`, the live version in effect at that
    /// instant is presented through a [`PretenderNode`](frost_pretend::PretenderNode).
    #[instrument(skip_all, fields(path = %path, as_of = ?as_of))]
    pub fn try_versioned_value<D: Document>(&self, path: &str, as_of: Option<UtcDateTime>) -> Result<Option<D>> {
        let mapper = self.mapper();
        let view = ReadOnlyView::open(&*self.repository, &self.credentials)?;
        let Some(node) = self.resolve_node(&view, path, as_of)? else {
            return Ok(None);
        };
        let Some(document_type) = mapper.document_type(&*node).or_raise(|| ErrorKind::Mapping)? else {
            tracing::debug!("No document type bound to the node's type");
            return Ok(None);
        };
        tracing::debug!(%document_type, "Mapping versioned document");
        let document = map_node::<D>(node, &mapper).or_raise(|| ErrorKind::Mapping)?;
        Ok(Some(document))
    }

    fn mapper(&self) -> MapperHandle {
        self.context
            .as_ref()
            .and_then(|context| context.mapper())
            .unwrap_or_else(|| self.mapper.clone())
    }

    /// The node the document should be mapped from: a pretender over the
    /// frozen content of the resolved version, or the live node when the
    /// history only offers its root version.
    fn resolve_node(&self, view: &ReadOnlyView, path: &str, as_of: Option<UtcDateTime>) -> Result<Option<NodeHandle>> {
        let session = view.session();
        if !session.node_exists(path).or_raise(|| ErrorKind::Lookup)? {
            tracing::debug!("No document at path");
            return Ok(None);
        }
        let handle = session.node(path).or_raise(|| ErrorKind::Lookup)?;
        let Some(versionable) = find_versionable_node(&handle).or_raise(|| ErrorKind::Resolve)? else {
            tracing::debug!("Document is not versioned");
            return Ok(None);
        };
        let versions = all_linear_versions(&*versionable).or_raise(|| ErrorKind::Resolve)?;
        let Some(version) = version_as_of(&versions, as_of).or_raise(|| ErrorKind::Resolve)? else {
            tracing::debug!(versions = versions.len(), "No version in effect");
            return Ok(None);
        };

        if version.is_root().or_raise(|| ErrorKind::Resolve)? {
            if as_of.is_some() && versions.len() > 1 {
                tracing::debug!(versions = versions.len(), "No versioned content available");
                return Ok(None);
            }
            tracing::debug!("Nothing checked in to go back to; using current document");
            return Ok(Some(versionable));
        }

        let created = version.created().or_raise(|| ErrorKind::Decorate)?;
        let frozen = version
            .frozen_node()
            .or_raise(|| ErrorKind::Decorate)?
            .ok_or_raise(|| ErrorKind::Decorate)?;
        let pretender: NodeHandle = pretend(frozen, created, as_of).or_raise(|| ErrorKind::Decorate)?;
        Ok(Some(pretender))
    }
}
