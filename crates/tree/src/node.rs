//! The node contract every tree consumer reads through.

use crate::error::Result;
use crate::locale::{Locale, Localized};
use crate::session::SessionHandle;
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Shared handle to any node implementation.
pub type NodeHandle = Arc<dyn Node>;

/// A node in the content tree.
///
/// This is the ordinary read interface: live nodes from a store implement it,
/// and so does anything pretending to be one. Every operation is fallible
/// because reads go through a session that can fail or be released.
///
/// # Capabilities
/// Stores with richer nodes expose them through [`as_rich()`](Self::as_rich),
/// which callers use as a capability check rather than inspecting type names.
///
/// # Examples
///
/// ```
/// use frost_tree::{Node, error::Result};
///
/// fn titles(document: &dyn Node) -> Result<Vec<String>> {
///     let mut titles = Vec::new();
///     for child in document.nodes_matching("*:title")?.present() {
///         if let Some(title) = child.string_property("ns1:text")? {
///             titles.push(title);
///         }
///     }
///     Ok(titles)
/// }
/// ```
pub trait Node: Send + Sync + Debug {
    fn name(&self) -> Result<String>;

    /// Absolute path of the node.
    fn path(&self) -> Result<String>;

    /// Store-assigned identifier, stable across renames.
    fn identifier(&self) -> Result<String>;

    /// 1-based index among same-named siblings.
    fn index(&self) -> Result<usize>;

    /// Name of the node's primary type.
    fn primary_type(&self) -> Result<String>;

    /// Names of the mixin types attached to the node.
    fn mixin_types(&self) -> Result<Vec<String>>;

    /// Whether the node is of the given type, through its primary type or any
    /// of its mixins.
    fn is_node_type(&self, node_type: &str) -> Result<bool>;

    fn has_property(&self, name: &str) -> Result<bool>;

    /// Returns [`PropertyNotFound`](crate::error::ErrorKind::PropertyNotFound)
    /// if the node does not carry the property.
    fn property(&self, name: &str) -> Result<Value>;

    fn property_names(&self) -> Result<Vec<String>>;

    fn has_node(&self, rel_path: &str) -> Result<bool>;

    /// Returns [`PathNotFound`](crate::error::ErrorKind::PathNotFound) if no
    /// node exists at the relative path.
    fn node(&self, rel_path: &str) -> Result<NodeHandle>;

    /// All children, in storage order.
    fn nodes(&self) -> Result<NodeIter>;

    /// Children whose name matches a `|`-separated name pattern.
    /// See [`NamePattern`](crate::NamePattern).
    fn nodes_matching(&self, pattern: &str) -> Result<NodeIter>;

    /// Children whose name matches any of the globs.
    /// See [`NamePattern::from_globs`](crate::NamePattern::from_globs).
    fn nodes_matching_any(&self, globs: &[&str]) -> Result<NodeIter>;

    fn parent(&self) -> Result<NodeHandle>;

    /// The session the node was read through.
    fn session(&self) -> Result<SessionHandle>;

    /// The extended capability set, when the node supports it.
    fn as_rich(&self) -> Option<&dyn RichNode> {
        None
    }

    /// For downcasting to a concrete implementation.
    fn as_any(&self) -> &dyn Any;

    /// Reads a single-valued property as a string, or `None` when the node
    /// does not carry it.
    fn string_property(&self, name: &str) -> Result<Option<String>> {
        if !self.has_property(name)? {
            return Ok(None);
        }
        self.property(name)?.string().map(Some)
    }
}

/// Extended capability set offered by richer stores.
pub trait RichNode: Node {
    /// Display name of the node for the locale; `None` asks for the name
    /// without any particular locale.
    fn localized_name(&self, locale: Option<&Locale>) -> Result<String>;

    /// Every localized display name the node carries.
    fn localized_names(&self) -> Result<HashMap<Localized, String>>;

    /// The canonical counterpart of a derived or virtual node, `None` when
    /// there is none.
    fn canonical(&self) -> Result<Option<NodeHandle>>;

    /// Descendants carrying changes that have not been saved yet.
    fn pending_changes(&self) -> Result<NodeIter>;

    /// Whether the node is computed by the store rather than persisted.
    fn is_virtual(&self) -> Result<bool>;

    /// Recomputes store-derived properties. Returns `true` on success.
    fn recompute_derived_data(&self) -> Result<bool>;
}

/// Child nodes returned by a listing operation.
///
/// Entries are `Option`s because a store may hand back an absent entry for a
/// child that disappeared or became unreadable after the listing was taken.
/// Use [`present()`](Self::present) to skip those.
pub struct NodeIter {
    inner: Box<dyn Iterator<Item = Option<NodeHandle>> + Send>,
    remaining: Option<usize>,
}

impl NodeIter {
    /// Wraps a lazily evaluated sequence of unknown length.
    pub fn new(iter: impl Iterator<Item = Option<NodeHandle>> + Send + 'static) -> Self {
        Self {
            inner: Box::new(iter),
            remaining: None,
        }
    }

    pub fn empty() -> Self {
        Self::from(Vec::new())
    }

    /// Number of entries left, when known.
    pub fn size(&self) -> Option<usize> {
        self.remaining
    }

    /// Only the entries that are actually there.
    pub fn present(self) -> impl Iterator<Item = NodeHandle> + Send {
        self.flatten()
    }
}

impl From<Vec<NodeHandle>> for NodeIter {
    fn from(nodes: Vec<NodeHandle>) -> Self {
        Self {
            remaining: Some(nodes.len()),
            inner: Box::new(nodes.into_iter().map(Some)),
        }
    }
}

impl Iterator for NodeIter {
    type Item = Option<NodeHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next();
        if next.is_some() {
            self.remaining = self.remaining.map(|r| r.saturating_sub(1));
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(r) => (r, Some(r)),
            None => self.inner.size_hint(),
        }
    }
}

impl Debug for NodeIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIter").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}
