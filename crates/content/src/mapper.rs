//! Object mapping and the request scope it can come from.

use frost_tree::Node;
use frost_tree::error::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

pub type MapperHandle = Arc<dyn ObjectMapper>;
pub type RequestContextHandle = Arc<dyn RequestContext>;

/// The mapping engine: knows which document type a node maps onto.
pub trait ObjectMapper: Send + Sync + Debug {
    /// The document type bound to the node's primary type, if any.
    fn document_type(&self, node: &dyn Node) -> Result<Option<String>>;
}

/// Scope of the request a lookup runs in, when there is one.
pub trait RequestContext: Send + Sync {
    /// The mapper already in use for the request.
    fn mapper(&self) -> Option<MapperHandle>;
}

/// An [`ObjectMapper`] from a fixed table of primary type to document type.
///
/// ```
/// use frost_content::TypeBindings;
///
/// let bindings = TypeBindings::default()
///     .bind("ns1:service", "Service")
///     .bind("hippostd:html", "Html");
/// assert_eq!(bindings.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeBindings {
    bindings: HashMap<String, String>,
}

impl TypeBindings {
    pub fn bind(mut self, primary_type: impl Into<String>, document_type: impl Into<String>) -> Self {
        self.bindings.insert(primary_type.into(), document_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl ObjectMapper for TypeBindings {
    fn document_type(&self, node: &dyn Node) -> Result<Option<String>> {
        Ok(self.bindings.get(&node.primary_type()?).cloned())
    }
}
