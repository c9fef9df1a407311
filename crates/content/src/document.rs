//! The application-side shape a node is mapped onto.

use crate::mapper::MapperHandle;
use frost_tree::NodeHandle;
use frost_tree::error::Result;

/// An application type populated from a document node.
///
/// A document opts into receiving its backing node and the mapper through
/// the capability accessors; types that need neither only implement
/// [`instantiate()`](Self::instantiate).
///
/// # Examples
///
/// ```
/// use frost_content::{Document, NodeAware};
/// use frost_tree::{Node, NodeHandle, error::Result};
///
/// #[derive(Default)]
/// struct Service {
///     title: Option<String>,
/// }
///
/// impl Document for Service {
///     fn instantiate() -> Self {
///         Self::default()
///     }
///
///     fn as_node_aware(&mut self) -> Option<&mut dyn NodeAware> {
///         Some(self)
///     }
/// }
///
/// impl NodeAware for Service {
///     fn set_node(&mut self, node: NodeHandle) -> Result<()> {
///         self.title = node.string_property("ns1:title")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Document: Sized {
    fn instantiate() -> Self;

    fn as_node_aware(&mut self) -> Option<&mut dyn NodeAware> {
        None
    }

    fn as_mapper_aware(&mut self) -> Option<&mut dyn MapperAware> {
        None
    }
}

/// A document backed by a node.
///
/// The node is only readable while the view it came from is open, which for
/// versioned lookups ends when the lookup returns. Read whatever the document
/// needs here.
pub trait NodeAware {
    fn set_node(&mut self, node: NodeHandle) -> Result<()>;
}

/// A document that maps further nodes itself, such as linked documents.
pub trait MapperAware {
    fn set_mapper(&mut self, mapper: MapperHandle);
}

/// Creates a `D` and hands it the node, then the mapper, as far as it asks
/// for them.
pub fn map_node<D: Document>(node: NodeHandle, mapper: &MapperHandle) -> Result<D> {
    let mut document = D::instantiate();
    if let Some(aware) = document.as_node_aware() {
        aware.set_node(node)?;
    }
    if let Some(aware) = document.as_mapper_aware() {
        aware.set_mapper(mapper.clone());
    }
    Ok(document)
}
