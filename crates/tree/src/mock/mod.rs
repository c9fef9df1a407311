//! In-memory content tree for testing.

mod node;
mod session;

pub use self::node::MemoryNode;
pub use self::session::{MemoryHistory, MemorySession, MemoryVersion};
use crate::consts::{FROZEN_NODE, FROZEN_NODE_NAME, FROZEN_PRIMARY_TYPE, ROOT_VERSION};
use crate::error::{ErrorKind, Result};
use crate::path::{normalize, segment};
use crate::session::{Credentials, Repository, SessionHandle};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use time::UtcDateTime;

/// Declarative description of a node and its subtree.
///
/// ```
/// use frost_tree::mock::NodeBuilder;
///
/// let handle = NodeBuilder::new("doc1", "hippo:handle").child(
///     NodeBuilder::new("doc1", "ns1:service")
///         .mixin("mix:versionable")
///         .property("hippostd:state", "unpublished"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    name: String,
    primary_type: String,
    mixins: Vec<String>,
    properties: BTreeMap<String, Value>,
    children: Vec<NodeBuilder>,
    identifier: Option<String>,
    poisoned: bool,
    vanished: bool,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_type: primary_type.into(),
            mixins: Vec::new(),
            properties: BTreeMap::new(),
            children: Vec::new(),
            identifier: None,
            poisoned: false,
            vanished: false,
        }
    }

    /// The frozen node of a version, captured from a node of type `real_type`.
    pub fn frozen(real_type: impl Into<String>) -> Self {
        Self::frozen_child(FROZEN_NODE_NAME, real_type)
    }

    /// A node inside a frozen subtree, captured from a node of type `real_type`.
    pub fn frozen_child(name: impl Into<String>, real_type: impl Into<String>) -> Self {
        let real_type: String = real_type.into();
        Self::new(name, FROZEN_NODE).property(FROZEN_PRIMARY_TYPE, real_type)
    }

    pub fn mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixins.push(mixin.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Overrides the identifier, which otherwise defaults to the node's path.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Every read of the node's type, properties or children fails with
    /// [`Backend`](ErrorKind::Backend).
    pub fn poisoned(mut self) -> Self {
        self.poisoned = true;
        self
    }

    /// The node shows up as an absent entry in its parent's listings and
    /// cannot be fetched by path.
    pub fn vanished(mut self) -> Self {
        self.vanished = true;
        self
    }

    fn build(self, path: &str) -> Arc<NodeData> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let children = self
            .children
            .into_iter()
            .map(|child| {
                let index = seen.entry(child.name.clone()).and_modify(|i| *i += 1).or_insert(1);
                let child_path = match path {
                    "/" => format!("/{}", segment(&child.name, *index)),
                    parent => format!("{parent}/{}", segment(&child.name, *index)),
                };
                child.build(&child_path)
            })
            .collect();
        Arc::new(NodeData {
            identifier: self.identifier.unwrap_or_else(|| path.to_string()),
            name: self.name,
            primary_type: self.primary_type,
            mixins: self.mixins,
            properties: self.properties,
            children,
            poisoned: self.poisoned,
            vanished: self.vanished,
        })
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) identifier: String,
    pub(crate) primary_type: String,
    pub(crate) mixins: Vec<String>,
    pub(crate) properties: BTreeMap<String, Value>,
    pub(crate) children: Vec<Arc<NodeData>>,
    pub(crate) poisoned: bool,
    pub(crate) vanished: bool,
}

/// Declarative description of one version in a history.
#[derive(Debug, Clone)]
pub struct VersionBuilder {
    name: String,
    created: UtcDateTime,
    frozen: Option<NodeBuilder>,
}

impl VersionBuilder {
    pub fn new(name: impl Into<String>, created: UtcDateTime, frozen: NodeBuilder) -> Self {
        Self {
            name: name.into(),
            created,
            frozen: Some(frozen),
        }
    }

    /// The marker version created when versioning was first enabled. Its
    /// frozen node carries the type of the versionable node and nothing else.
    pub fn root(created: UtcDateTime, real_type: impl Into<String>) -> Self {
        Self::new(ROOT_VERSION, created, NodeBuilder::frozen(real_type))
    }

    pub fn without_frozen_node(name: impl Into<String>, created: UtcDateTime) -> Self {
        Self {
            name: name.into(),
            created,
            frozen: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct VersionData {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) created: UtcDateTime,
    pub(crate) frozen: Option<Arc<NodeData>>,
}

#[derive(Debug)]
pub(crate) struct HistoryData {
    pub(crate) versionable_identifier: String,
    pub(crate) versions: Vec<Arc<VersionData>>,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) user_id: String,
    pub(crate) live: AtomicBool,
    pub(crate) root: Arc<NodeData>,
    pub(crate) histories: Arc<HashMap<String, Arc<HistoryData>>>,
    pub(crate) rich: bool,
    pub(crate) open: Arc<AtomicUsize>,
}

impl SessionState {
    pub(crate) fn check(&self) -> Result<()> {
        match self.live.load(Ordering::SeqCst) {
            true => Ok(()),
            false => exn::bail!(ErrorKind::SessionClosed),
        }
    }
}

/// In-memory content repository for testing.
///
/// The tree and its version histories are fixed at construction; sessions
/// opened with [`login`](Repository::login) read from it and keep track of
/// whether they have been released, so tests can assert that every session
/// is logged out and that nodes become unreadable afterwards.
///
/// # Examples
///
/// ```
/// use frost_tree::mock::{MemoryRepository, NodeBuilder};
/// use frost_tree::{Credentials, Repository};
///
/// let repository = MemoryRepository::with_nodes([
///     NodeBuilder::new("content", "nt:unstructured").child(NodeBuilder::new("doc1", "hippo:handle")),
/// ]);
/// let session = repository.login(&Credentials::new("previewuser", None)).unwrap();
/// assert!(session.node_exists("/content/doc1").unwrap());
/// session.logout();
/// assert_eq!(repository.open_sessions(), 0);
/// ```
pub struct MemoryRepository {
    root: Arc<NodeData>,
    histories: Arc<HashMap<String, Arc<HistoryData>>>,
    credentials: Option<Credentials>,
    rich: bool,
    open: Arc<AtomicUsize>,
}

impl MemoryRepository {
    /// Create a repository whose root holds the given nodes.
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeBuilder>) -> Self {
        let root = nodes.into_iter().fold(NodeBuilder::new("", "rep:root"), NodeBuilder::child);
        Self {
            root: root.build("/"),
            histories: Arc::new(HashMap::new()),
            credentials: None,
            rich: false,
            open: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Attach a linear version history to the versionable node at `path`.
    ///
    /// Panics if the path is invalid or no node exists there. If test setup
    /// is wrong, then test should not pass.
    pub fn with_history(mut self, path: &str, versions: impl IntoIterator<Item = VersionBuilder>) -> Self {
        let Ok(path) = normalize(path) else {
            panic!("MemoryRepository::with_history: invalid path {path}");
        };
        let Some(versionable) = self.find(&path) else {
            panic!("MemoryRepository::with_history: no node at {path}");
        };
        let storage = format!("/jcr:system/jcr:versionStorage/vh{}", self.histories.len());
        let versions = versions
            .into_iter()
            .map(|version| {
                let version_path = format!("{storage}/{}", version.name);
                Arc::new(VersionData {
                    frozen: version.frozen.map(|f| f.build(&format!("{version_path}/{FROZEN_NODE_NAME}"))),
                    name: version.name,
                    path: version_path,
                    created: version.created,
                })
            })
            .collect();
        let history = HistoryData {
            versionable_identifier: versionable.identifier.clone(),
            versions,
        };
        Arc::make_mut(&mut self.histories).insert(path, Arc::new(history));
        self
    }

    /// Only accept logins with exactly these credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Nodes read from this repository expose the extended
    /// [`RichNode`](crate::RichNode) capability set.
    pub fn with_rich_nodes(mut self) -> Self {
        self.rich = true;
        self
    }

    /// Number of sessions opened and not yet logged out.
    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    fn find(&self, path: &str) -> Option<Arc<NodeData>> {
        let mut current = self.root.clone();
        for segment in crate::path::segments(path) {
            let (name, index) = crate::path::parse_segment(segment).ok()?;
            current = current.children.iter().filter(|c| c.name == name).nth(index - 1)?.clone();
        }
        Some(current)
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::with_nodes(std::iter::empty())
    }
}

impl Repository for MemoryRepository {
    fn login(&self, credentials: &Credentials) -> Result<SessionHandle> {
        if let Some(expected) = &self.credentials
            && expected != credentials
        {
            exn::bail!(ErrorKind::Login(credentials.user_id.clone()));
        }
        let state = SessionState {
            user_id: credentials.user_id.clone(),
            live: AtomicBool::new(true),
            root: self.root.clone(),
            histories: self.histories.clone(),
            rich: self.rich,
            open: self.open.clone(),
        };
        self.open.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(user_id = %credentials.user_id, "Opened in-memory session");
        Ok(Arc::new(MemorySession::new(Arc::new(state))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{HANDLE, VERSIONABLE};
    use crate::{Node, Session, Version, VersionHistory};
    use time::{Date, Month, Time};

    fn at(day: u8) -> UtcDateTime {
        UtcDateTime::new(Date::from_calendar_date(2015, Month::March, day).unwrap(), Time::MIDNIGHT)
    }

    fn repository() -> MemoryRepository {
        MemoryRepository::with_nodes([NodeBuilder::new("content", "nt:unstructured").child(
            NodeBuilder::new("doc1", HANDLE)
                .child(NodeBuilder::new("doc1", "ns1:service").property("hippostd:state", "published"))
                .child(
                    NodeBuilder::new("doc1", "ns1:service")
                        .mixin(VERSIONABLE)
                        .property("hippostd:state", "unpublished")
                        .child(NodeBuilder::new("ns1:description", "hippostd:html")),
                ),
        )])
        .with_history(
            "/content/doc1/doc1[2]",
            [
                VersionBuilder::root(at(1), "ns1:service"),
                VersionBuilder::new("1.0", at(2), NodeBuilder::frozen("ns1:service").property("ns1:title", "MRI")),
            ],
        )
    }

    fn login(repository: &MemoryRepository) -> SessionHandle {
        repository.login(&Credentials::new("previewuser", None)).unwrap()
    }

    #[test]
    fn test_same_name_siblings() {
        let repository = repository();
        let session = login(&repository);
        let first = session.node("/content/doc1/doc1").unwrap();
        let second = session.node("/content/doc1/doc1[2]").unwrap();
        assert_eq!(first.index().unwrap(), 1);
        assert_eq!(second.index().unwrap(), 2);
        assert_eq!(second.path().unwrap(), "/content/doc1/doc1[2]");
        assert_eq!(second.string_property("hippostd:state").unwrap().as_deref(), Some("unpublished"));
    }

    #[test]
    fn test_relative_lookup() {
        let repository = repository();
        let session = login(&repository);
        let variant = session.node("/content/doc1/doc1[2]").unwrap();
        assert!(variant.has_node("ns1:description").unwrap());
        let description = variant.node("ns1:description").unwrap();
        assert_eq!(description.path().unwrap(), "/content/doc1/doc1[2]/ns1:description");
        let handle = description.node("../..").unwrap();
        assert_eq!(handle.primary_type().unwrap(), HANDLE);
        let err = variant.node("missing").unwrap_err();
        assert!(matches!(&*err, ErrorKind::PathNotFound(_)));
    }

    #[test]
    fn test_version_history() {
        let repository = repository();
        let session = login(&repository);
        let history = session.version_history("/content/doc1/doc1[2]").unwrap().unwrap();
        assert_eq!(history.versionable_identifier().unwrap(), "/content/doc1/doc1[2]");
        let versions: Vec<_> = history.linear_versions().unwrap().collect();
        assert_eq!(versions.len(), 2);
        assert!(versions[0].is_root().unwrap());
        let frozen = versions[1].frozen_node().unwrap().unwrap();
        assert!(frozen.is_node_type(FROZEN_NODE).unwrap());
        assert_eq!(frozen.string_property("ns1:title").unwrap().as_deref(), Some("MRI"));
        assert!(frozen.path().unwrap().ends_with("/1.0/jcr:frozenNode"));
    }

    #[test]
    fn test_version_history_of_non_versionable_node() {
        let repository = repository();
        let session = login(&repository);
        let err = session.version_history("/content/doc1/doc1").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unsupported(_)));
    }

    #[test]
    fn test_logout_invalidates_nodes() {
        let repository = repository();
        let session = login(&repository);
        let node = session.node("/content/doc1").unwrap();
        assert_eq!(repository.open_sessions(), 1);
        session.logout();
        session.logout();
        assert_eq!(repository.open_sessions(), 0);
        assert!(!session.is_live());
        let err = node.primary_type().unwrap_err();
        assert!(matches!(&*err, ErrorKind::SessionClosed));
    }

    #[test]
    fn test_credentials_checked() {
        let repository = repository().with_credentials(Credentials::new("previewuser", Some("secret".to_string())));
        let err = repository.login(&Credentials::new("previewuser", None)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Login(_)));
        assert_eq!(repository.open_sessions(), 0);
        assert!(repository.login(&Credentials::new("previewuser", Some("secret".to_string()))).is_ok());
    }

    #[test]
    fn test_listing_filters_and_absent_entries() {
        let repository = MemoryRepository::with_nodes([NodeBuilder::new("parent", "nt:unstructured")
            .child(NodeBuilder::new("ns1:title", "nt:unstructured"))
            .child(NodeBuilder::new("ns1:body", "nt:unstructured").vanished())
            .child(NodeBuilder::new("ns2:title", "nt:unstructured"))]);
        let session = login(&repository);
        let parent = session.node("/parent").unwrap();
        let all: Vec<_> = parent.nodes().unwrap().collect();
        assert_eq!(all.len(), 3);
        assert!(all[1].is_none());
        let titles: Vec<_> = parent.nodes_matching("*:title").unwrap().present().collect();
        assert_eq!(titles.len(), 2);
        let ns1: Vec<_> = parent.nodes_matching_any(&["ns1:*"]).unwrap().present().collect();
        assert_eq!(ns1.len(), 1);
        assert!(!parent.has_node("ns1:body").unwrap());
    }

    #[test]
    fn test_poisoned_node_fails_reads() {
        let repository = MemoryRepository::with_nodes([NodeBuilder::new("broken", "nt:unstructured").poisoned()]);
        let session = login(&repository);
        let node = session.node("/broken").unwrap();
        assert_eq!(node.name().unwrap(), "broken");
        let err = node.property("anything").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Backend(_)));
    }

    #[test]
    #[should_panic(expected = "no node at")]
    fn test_with_history_panics_on_missing_node() {
        let _ = MemoryRepository::default().with_history("/nowhere", Vec::new());
    }
}
