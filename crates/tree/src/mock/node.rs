use super::{NodeData, SessionState};
use crate::consts::BASE;
use crate::error::{ErrorKind, Result};
use crate::locale::{Locale, Localized};
use crate::mock::MemorySession;
use crate::node::{Node, NodeHandle, NodeIter, RichNode};
use crate::path::{join, parse_segment, segment, segments};
use crate::pattern::NamePattern;
use crate::session::SessionHandle;
use crate::value::Value;
use exn::OptionExt;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Display name property carried by rich nodes.
const DISPLAY_NAME: &str = "hippo:name";

/// A node read through a [`MemorySession`].
#[derive(Clone)]
pub struct MemoryNode {
    data: Arc<NodeData>,
    path: String,
    index: usize,
    parent: Option<Arc<MemoryNode>>,
    state: Arc<SessionState>,
}

impl MemoryNode {
    pub(crate) fn root(state: Arc<SessionState>) -> Self {
        Self {
            data: state.root.clone(),
            path: "/".to_string(),
            index: 1,
            parent: None,
            state,
        }
    }

    /// A node outside the main tree, such as the frozen node of a version.
    pub(crate) fn detached(data: Arc<NodeData>, path: String, state: Arc<SessionState>) -> Self {
        Self {
            data,
            path,
            index: 1,
            parent: None,
            state,
        }
    }

    /// Walks an absolute, normalized path down from the root.
    pub(crate) fn lookup(state: &Arc<SessionState>, path: &str) -> Result<Option<Self>> {
        Self::root(state.clone()).descend(segments(path))
    }

    fn live(&self) -> Result<()> {
        self.state.check()
    }

    fn readable(&self) -> Result<()> {
        self.live()?;
        if self.data.poisoned {
            exn::bail!(ErrorKind::Backend(format!("read failed: {}", self.path)));
        }
        Ok(())
    }

    fn child_at(&self, data: Arc<NodeData>, index: usize) -> Self {
        let path = match self.path.as_str() {
            "/" => format!("/{}", segment(&data.name, index)),
            parent => format!("{parent}/{}", segment(&data.name, index)),
        };
        Self {
            data,
            path,
            index,
            parent: Some(Arc::new(self.clone())),
            state: self.state.clone(),
        }
    }

    /// Children paired with whether they are still there.
    fn children(&self) -> Vec<(Self, bool)> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        self.data
            .children
            .iter()
            .map(|child| {
                let index = *seen.entry(child.name.as_str()).and_modify(|i| *i += 1).or_insert(1);
                (self.child_at(child.clone(), index), !child.vanished)
            })
            .collect()
    }

    fn child(&self, name: &str, index: usize) -> Option<Self> {
        self.children()
            .into_iter()
            .filter(|(child, _)| child.data.name == name)
            .nth(index - 1)
            .and_then(|(child, present)| present.then_some(child))
    }

    fn descend<'a>(&self, path: impl Iterator<Item = &'a str>) -> Result<Option<Self>> {
        let mut current = self.clone();
        for segment in path {
            let (name, index) = parse_segment(segment)?;
            match current.child(name, index) {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn resolve(&self, rel_path: &str) -> Result<Option<Self>> {
        let target = join(&self.path, rel_path)?;
        if target == self.path {
            return Ok(Some(self.clone()));
        }
        let prefix = match self.path.as_str() {
            "/" => "/".to_string(),
            path => format!("{path}/"),
        };
        match target.strip_prefix(&prefix) {
            Some(rest) => self.descend(segments(rest)),
            // Outside this subtree: only reachable through the main tree.
            None => Self::lookup(&self.state, &target),
        }
    }

    fn listing(&self, filter: impl Fn(&str) -> bool) -> Result<NodeIter> {
        self.readable()?;
        let children: Vec<Option<NodeHandle>> = self
            .children()
            .into_iter()
            .filter(|(child, _)| filter(&child.data.name))
            .map(|(child, present)| present.then(|| Arc::new(child) as NodeHandle))
            .collect();
        Ok(NodeIter::new(children.into_iter()))
    }
}

impl fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNode").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Node for MemoryNode {
    fn name(&self) -> Result<String> {
        self.live()?;
        Ok(self.data.name.clone())
    }

    fn path(&self) -> Result<String> {
        self.live()?;
        Ok(self.path.clone())
    }

    fn identifier(&self) -> Result<String> {
        self.readable()?;
        Ok(self.data.identifier.clone())
    }

    fn index(&self) -> Result<usize> {
        self.live()?;
        Ok(self.index)
    }

    fn primary_type(&self) -> Result<String> {
        self.readable()?;
        Ok(self.data.primary_type.clone())
    }

    fn mixin_types(&self) -> Result<Vec<String>> {
        self.readable()?;
        Ok(self.data.mixins.clone())
    }

    fn is_node_type(&self, node_type: &str) -> Result<bool> {
        self.readable()?;
        Ok(self.data.primary_type == node_type || self.data.mixins.iter().any(|m| m == node_type) || node_type == BASE)
    }

    fn has_property(&self, name: &str) -> Result<bool> {
        self.readable()?;
        Ok(self.data.properties.contains_key(name))
    }

    fn property(&self, name: &str) -> Result<Value> {
        self.readable()?;
        self.data
            .properties
            .get(name)
            .cloned()
            .ok_or_raise(|| ErrorKind::PropertyNotFound(format!("{}/{name}", self.path)))
    }

    fn property_names(&self) -> Result<Vec<String>> {
        self.readable()?;
        Ok(self.data.properties.keys().cloned().collect())
    }

    fn has_node(&self, rel_path: &str) -> Result<bool> {
        self.readable()?;
        Ok(self.resolve(rel_path)?.is_some())
    }

    fn node(&self, rel_path: &str) -> Result<NodeHandle> {
        self.readable()?;
        self.resolve(rel_path)?
            .map(|node| Arc::new(node) as NodeHandle)
            .ok_or_raise(|| ErrorKind::PathNotFound(format!("{}/{rel_path}", self.path)))
    }

    fn nodes(&self) -> Result<NodeIter> {
        self.listing(|_| true)
    }

    fn nodes_matching(&self, pattern: &str) -> Result<NodeIter> {
        let pattern: NamePattern = pattern.parse()?;
        self.listing(|name| pattern.matches(name))
    }

    fn nodes_matching_any(&self, globs: &[&str]) -> Result<NodeIter> {
        let pattern = NamePattern::from_globs(globs.iter().copied())?;
        self.listing(|name| pattern.matches(name))
    }

    fn parent(&self) -> Result<NodeHandle> {
        self.live()?;
        self.parent
            .clone()
            .map(|parent| parent as NodeHandle)
            .ok_or_raise(|| ErrorKind::PathNotFound(format!("parent of {}", self.path)))
    }

    fn session(&self) -> Result<SessionHandle> {
        self.live()?;
        Ok(Arc::new(MemorySession::new(self.state.clone())))
    }

    fn as_rich(&self) -> Option<&dyn RichNode> {
        match self.state.rich {
            true => Some(self),
            false => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RichNode for MemoryNode {
    fn localized_name(&self, _locale: Option<&Locale>) -> Result<String> {
        self.readable()?;
        match self.data.properties.get(DISPLAY_NAME) {
            Some(display) => display.string(),
            None => Ok(self.data.name.clone()),
        }
    }

    fn localized_names(&self) -> Result<HashMap<Localized, String>> {
        Ok(HashMap::from([(Localized::unspecified(), self.localized_name(None)?)]))
    }

    fn canonical(&self) -> Result<Option<NodeHandle>> {
        self.live()?;
        Ok(Some(Arc::new(self.clone())))
    }

    fn pending_changes(&self) -> Result<NodeIter> {
        self.live()?;
        Ok(NodeIter::empty())
    }

    fn is_virtual(&self) -> Result<bool> {
        self.live()?;
        Ok(false)
    }

    fn recompute_derived_data(&self) -> Result<bool> {
        self.readable()?;
        Ok(true)
    }
}
