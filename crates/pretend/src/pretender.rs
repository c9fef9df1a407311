use frost_tree::consts::{FROZEN_MIXIN_TYPES, FROZEN_NODE, FROZEN_PRIMARY_TYPE};
use frost_tree::error::{ErrorKind, Result};
use frost_tree::{Locale, Localized, Node, NodeHandle, NodeIter, RichNode, SessionHandle, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use time::UtcDateTime;

/// Which node contract a [`PretenderNode`] exposes.
///
/// Decided once, from the frozen node it wraps: a pretender is only as
/// capable as the node behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The ordinary [`Node`] contract.
    Base,
    /// The ordinary contract plus [`RichNode`].
    Rich,
}

/// A frozen node that reads like the live node it was captured from.
///
/// Overrides type identity and child access, and passes everything else
/// through to the frozen node unchanged. The frozen node is shared, never
/// copied; [`frozen_node()`](Self::frozen_node) returns the very handle the
/// pretender was built from.
///
/// Reads go through the session the frozen node came from, so a pretender
/// stops working once that session has been released.
#[derive(Debug)]
pub struct PretenderNode {
    frozen: NodeHandle,
    created: UtcDateTime,
    as_of: Option<UtcDateTime>,
    capability: Capability,
}

/// Wraps `frozen` so it reads like the node it was captured from.
///
/// `created` is when the version holding the frozen node was checked in and
/// `as_of` the instant the caller asked for. Neither affects how the node
/// reads; both are kept for the caller and passed on to every wrapped child.
///
/// Returns [`InvalidArgument`](ErrorKind::InvalidArgument) if `frozen` is not
/// an `nt:frozenNode`.
pub fn pretend(frozen: NodeHandle, created: UtcDateTime, as_of: Option<UtcDateTime>) -> Result<Arc<PretenderNode>> {
    if !frozen.is_node_type(FROZEN_NODE)? {
        exn::bail!(ErrorKind::InvalidArgument(format!("not a frozen node: {}", frozen.path()?)));
    }
    let capability = match frozen.as_rich() {
        Some(_) => Capability::Rich,
        None => Capability::Base,
    };
    tracing::trace!(?capability, ?created, ?as_of, "Presenting frozen node as live");
    Ok(Arc::new(PretenderNode {
        frozen,
        created,
        as_of,
        capability,
    }))
}

impl PretenderNode {
    /// The frozen node every read is delegated to.
    pub fn frozen_node(&self) -> &NodeHandle {
        &self.frozen
    }

    /// When the version holding the frozen node was checked in.
    pub fn created(&self) -> UtcDateTime {
        self.created
    }

    /// The instant the caller asked for, if any.
    pub fn as_of(&self) -> Option<UtcDateTime> {
        self.as_of
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Mixin types the live node carried when it was frozen.
    ///
    /// Informational only: [`is_node_type()`](Node::is_node_type) considers
    /// the mixins attached to the frozen node itself, not these.
    pub fn real_mixin_types(&self) -> Result<Vec<String>> {
        match self.frozen.has_property(FROZEN_MIXIN_TYPES)? {
            true => self.frozen.property(FROZEN_MIXIN_TYPES)?.strings(),
            false => Ok(Vec::new()),
        }
    }

    /// Recovers the pretender behind a node handed out by one, such as a
    /// child returned from [`node()`](Node::node).
    pub fn downcast(node: &dyn Node) -> Option<&PretenderNode> {
        node.as_any().downcast_ref()
    }

    fn wrap(&self, child: NodeHandle) -> Result<NodeHandle> {
        Ok(pretend(child, self.created, self.as_of)?)
    }

    fn wrap_all(&self, children: NodeIter) -> Result<NodeIter> {
        let wrapped = children.present().map(|child| self.wrap(child)).collect::<Result<Vec<_>>>()?;
        Ok(NodeIter::from(wrapped))
    }
}

impl Node for PretenderNode {
    fn name(&self) -> Result<String> {
        self.frozen.name()
    }

    fn path(&self) -> Result<String> {
        self.frozen.path()
    }

    fn identifier(&self) -> Result<String> {
        self.frozen.identifier()
    }

    fn index(&self) -> Result<usize> {
        self.frozen.index()
    }

    fn primary_type(&self) -> Result<String> {
        self.frozen.property(FROZEN_PRIMARY_TYPE)?.string()
    }

    fn mixin_types(&self) -> Result<Vec<String>> {
        self.frozen.mixin_types()
    }

    /// True for `nt:frozenNode`, for the real primary type, and for any mixin
    /// attached to the frozen node.
    fn is_node_type(&self, node_type: &str) -> Result<bool> {
        Ok(self.frozen.is_node_type(node_type)? || self.primary_type()? == node_type)
    }

    fn has_property(&self, name: &str) -> Result<bool> {
        self.frozen.has_property(name)
    }

    fn property(&self, name: &str) -> Result<Value> {
        self.frozen.property(name)
    }

    fn property_names(&self) -> Result<Vec<String>> {
        self.frozen.property_names()
    }

    fn has_node(&self, rel_path: &str) -> Result<bool> {
        self.frozen.has_node(rel_path)
    }

    fn node(&self, rel_path: &str) -> Result<NodeHandle> {
        self.wrap(self.frozen.node(rel_path)?)
    }

    fn nodes(&self) -> Result<NodeIter> {
        self.wrap_all(self.frozen.nodes()?)
    }

    fn nodes_matching(&self, pattern: &str) -> Result<NodeIter> {
        self.wrap_all(self.frozen.nodes_matching(pattern)?)
    }

    fn nodes_matching_any(&self, globs: &[&str]) -> Result<NodeIter> {
        self.wrap_all(self.frozen.nodes_matching_any(globs)?)
    }

    fn parent(&self) -> Result<NodeHandle> {
        self.frozen.parent()
    }

    fn session(&self) -> Result<SessionHandle> {
        self.frozen.session()
    }

    fn as_rich(&self) -> Option<&dyn RichNode> {
        match self.capability {
            Capability::Rich => Some(self),
            Capability::Base => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Frozen content carries no localization data and can have no unsaved or
/// derived state, so these answer from the frozen node's plain name.
impl RichNode for PretenderNode {
    fn localized_name(&self, _locale: Option<&Locale>) -> Result<String> {
        self.frozen.name()
    }

    fn localized_names(&self) -> Result<HashMap<Localized, String>> {
        let name = self.frozen.name()?;
        Ok(HashMap::from([
            (Localized::unspecified(), name.clone()),
            (Localized::of(Locale::system_default()), name),
        ]))
    }

    fn canonical(&self) -> Result<Option<NodeHandle>> {
        Ok(Some(self.frozen.clone()))
    }

    fn pending_changes(&self) -> Result<NodeIter> {
        Ok(NodeIter::empty())
    }

    fn is_virtual(&self) -> Result<bool> {
        Ok(false)
    }

    fn recompute_derived_data(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_tree::mock::{MemoryRepository, NodeBuilder};
    use frost_tree::{Credentials, Repository, Session};
    use rstest::rstest;
    use time::{Date, Month, Time};

    const FROZEN_PATH: &str = "/versionStorage1/versionHistory1/1.0/jcr:frozenNode";

    fn at(day: u8) -> UtcDateTime {
        UtcDateTime::new(Date::from_calendar_date(2015, Month::June, day).unwrap(), Time::MIDNIGHT)
    }

    fn service() -> NodeBuilder {
        NodeBuilder::frozen("ns1:service")
            .mixin("mix:referenceable")
            .property("ns1:title", "MRI")
            .property("ns1:variableid", "mri")
            .property(FROZEN_MIXIN_TYPES, vec!["mix:versionable", "hippostd:publishable"])
            .child(
                NodeBuilder::frozen_child("ns1:description", "hippostd:html")
                    .property("hippostd:content", "<p>Magnetic Resonance imaging</p>"),
            )
            .child(NodeBuilder::frozen_child("ns1:link", "hippo:mirror").vanished())
            .child(NodeBuilder::frozen_child("ns1:image", "hippogallerypicker:imagelink"))
            .child(NodeBuilder::frozen_child("ns2:title", "ns2:text"))
    }

    fn repository(frozen: NodeBuilder) -> MemoryRepository {
        MemoryRepository::with_nodes([
            NodeBuilder::new("versionStorage1", "rep:versionStorage").child(
                NodeBuilder::new("versionHistory1", "nt:versionHistory")
                    .child(NodeBuilder::new("1.0", "nt:version").child(frozen)),
            ),
            NodeBuilder::new("content", "nt:unstructured").child(NodeBuilder::new("doc1", "hippo:handle")),
        ])
    }

    fn login(repository: &MemoryRepository) -> SessionHandle {
        repository.login(&Credentials::new("previewuser", None)).unwrap()
    }

    #[test]
    fn test_pretend_not_frozen() {
        let repository = repository(service());
        let session = login(&repository);
        let frozen = session.node(FROZEN_PATH).unwrap();
        assert!(frozen.is_node_type(FROZEN_NODE).unwrap());
        assert!(!frozen.is_node_type("ns1:service").unwrap());
        assert_eq!(frozen.primary_type().unwrap(), FROZEN_NODE);

        let pretender = pretend(frozen.clone(), at(1), Some(at(2))).unwrap();
        assert!(Arc::ptr_eq(pretender.frozen_node(), &frozen));
        assert_eq!(pretender.created(), at(1));
        assert_eq!(pretender.as_of(), Some(at(2)));

        assert!(pretender.is_node_type(FROZEN_NODE).unwrap());
        assert!(pretender.is_node_type("ns1:service").unwrap());
        assert_eq!(pretender.primary_type().unwrap(), "ns1:service");
        assert_eq!(pretender.property("ns1:title").unwrap().string().unwrap(), "MRI");
        assert_eq!(pretender.property("ns1:variableid").unwrap().string().unwrap(), "mri");

        assert!(pretender.has_node("ns1:description").unwrap());
        let description = pretender.node("ns1:description").unwrap();
        let description = PretenderNode::downcast(&*description).expect("child should be a pretender");
        assert_eq!(
            description.frozen_node().path().unwrap(),
            frozen.node("ns1:description").unwrap().path().unwrap()
        );
        assert_eq!(description.created(), at(1));
        assert_eq!(description.as_of(), Some(at(2)));
        assert!(description.is_node_type(FROZEN_NODE).unwrap());
        assert!(description.is_node_type("hippostd:html").unwrap());
        assert_eq!(
            description.property("hippostd:content").unwrap().string().unwrap(),
            "<p>Magnetic Resonance imaging</p>"
        );
    }

    #[rstest]
    #[case(FROZEN_NODE, true)]
    #[case("ns1:service", true)]
    #[case("mix:referenceable", true)]
    #[case("nt:base", true)]
    #[case("hippostd:html", false)]
    #[case("ns1:other", false)]
    // Mixins the live node had are recorded but not reported as types.
    #[case("mix:versionable", false)]
    fn test_is_node_type(#[case] node_type: &str, #[case] expected: bool) {
        let repository = repository(service());
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();
        assert_eq!(pretender.is_node_type(node_type).unwrap(), expected);
    }

    #[test]
    fn test_real_mixin_types() {
        let repository = repository(service());
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();
        assert_eq!(pretender.real_mixin_types().unwrap(), ["mix:versionable", "hippostd:publishable"]);
        assert_eq!(pretender.mixin_types().unwrap(), ["mix:referenceable"]);
        let description = pretender.node("ns1:description").unwrap();
        let description = PretenderNode::downcast(&*description).unwrap();
        assert!(description.real_mixin_types().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_live_node() {
        let repository = repository(service());
        let session = login(&repository);
        let err = pretend(session.node("/content/doc1").unwrap(), at(1), None).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn test_children_keep_order_and_skip_absent_entries() {
        let repository = repository(service());
        let session = login(&repository);
        let frozen = session.node(FROZEN_PATH).unwrap();
        let pretender = pretend(frozen.clone(), at(1), None).unwrap();

        let expected: Vec<String> = frozen.nodes().unwrap().present().map(|n| n.path().unwrap()).collect();
        let children = pretender.nodes().unwrap();
        assert_eq!(children.size(), Some(expected.len()));
        let children: Vec<NodeHandle> = children.present().collect();
        let paths: Vec<String> = children.iter().map(|n| n.path().unwrap()).collect();
        assert_eq!(paths, expected);
        assert_eq!(children.len(), 3);
        for child in &children {
            let child = PretenderNode::downcast(&**child).expect("child should be a pretender");
            assert!(child.is_node_type(FROZEN_NODE).unwrap());
            let real_type = child.frozen_node().string_property(FROZEN_PRIMARY_TYPE).unwrap().unwrap();
            assert!(child.is_node_type(&real_type).unwrap());
        }
        let types: Vec<String> = children.iter().map(|n| n.primary_type().unwrap()).collect();
        assert_eq!(types, ["hippostd:html", "hippogallerypicker:imagelink", "ns2:text"]);
    }

    #[test]
    fn test_filtered_children() {
        let repository = repository(service());
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();

        let titles: Vec<String> = pretender
            .nodes_matching("*:title | ns1:description")
            .unwrap()
            .present()
            .map(|n| n.primary_type().unwrap())
            .collect();
        assert_eq!(titles, ["hippostd:html", "ns2:text"]);

        let ns1: Vec<String> =
            pretender.nodes_matching_any(&["ns1:*"]).unwrap().present().map(|n| n.name().unwrap()).collect();
        assert_eq!(ns1, ["ns1:description", "ns1:image"]);
    }

    #[test]
    fn test_base_capability() {
        let repository = repository(service());
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();
        assert_eq!(pretender.capability(), Capability::Base);
        assert!(pretender.as_rich().is_none());
    }

    #[test]
    fn test_rich_capability() {
        let repository = repository(service().property("hippo:name", "Magnetic Resonance")).with_rich_nodes();
        let session = login(&repository);
        let frozen = session.node(FROZEN_PATH).unwrap();
        let pretender = pretend(frozen.clone(), at(1), None).unwrap();
        assert_eq!(pretender.capability(), Capability::Rich);

        let rich = pretender.as_rich().expect("pretender should be rich");
        assert_eq!(rich.localized_name(None).unwrap(), "jcr:frozenNode");
        assert_eq!(rich.localized_name(Some(&Locale::new("nl_NL"))).unwrap(), "jcr:frozenNode");
        let names = rich.localized_names().unwrap();
        assert_eq!(names.get(&Localized::unspecified()).map(String::as_str), Some("jcr:frozenNode"));
        assert_eq!(
            names.get(&Localized::of(Locale::system_default())).map(String::as_str),
            Some("jcr:frozenNode")
        );
        assert!(Arc::ptr_eq(&rich.canonical().unwrap().unwrap(), &frozen));
        assert_eq!(rich.pending_changes().unwrap().size(), Some(0));
        assert!(!rich.is_virtual().unwrap());
        assert!(rich.recompute_derived_data().unwrap());

        let description = pretender.node("ns1:description").unwrap();
        assert!(description.as_rich().is_some());
    }

    #[test]
    fn test_store_failure_propagates() {
        let repository = repository(service().child(NodeBuilder::frozen_child("ns1:broken", "ns1:text").poisoned()));
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();
        let err = pretender.node("ns1:broken").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Backend(_)));
        let err = pretender.nodes().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Backend(_)));
    }

    #[test]
    fn test_missing_real_type_is_reported() {
        let repository = repository(NodeBuilder::new("jcr:frozenNode", FROZEN_NODE));
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();
        let err = pretender.primary_type().unwrap_err();
        assert!(matches!(&*err, ErrorKind::PropertyNotFound(_)));
    }

    #[test]
    fn test_released_session_invalidates_pretender() {
        let repository = repository(service());
        let session = login(&repository);
        let pretender = pretend(session.node(FROZEN_PATH).unwrap(), at(1), None).unwrap();
        session.logout();
        let err = pretender.property("ns1:title").unwrap_err();
        assert!(matches!(&*err, ErrorKind::SessionClosed));
    }
}
