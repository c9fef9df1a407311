//! Documents as they were at a given instant.
//!
//! [`VersionedContent`] ties the pieces together: it opens a read-only view,
//! finds the document's versionable node, resolves the version in effect at
//! the requested instant and maps its frozen content onto an application
//! [`Document`], presenting it as live content along the way.
//!
//! ```no_run
//! use frost_config::Config;
//! use frost_content::{Document, MapperHandle, TypeBindings, VersionedContent};
//! use frost_tree::RepositoryHandle;
//! use std::sync::Arc;
//! use time::UtcDateTime;
//!
//! struct Service;
//!
//! impl Document for Service {
//!     fn instantiate() -> Self {
//!         Service
//!     }
//! }
//!
//! fn lookup(repository: RepositoryHandle) -> Option<Service> {
//!     let config = Config::load(None).ok()?;
//!     let mapper: MapperHandle = Arc::new(TypeBindings::default().bind("ns1:service", "Service"));
//!     let content = VersionedContent::from_config(repository, &config, mapper);
//!     content.versioned_value("/content/documents/doc1", Some(UtcDateTime::now()))
//! }
//! ```

mod document;
pub mod error;
mod mapper;
mod versioned;
mod view;

pub use crate::document::{Document, MapperAware, NodeAware, map_node};
pub use crate::mapper::{MapperHandle, ObjectMapper, RequestContext, RequestContextHandle, TypeBindings};
pub use crate::versioned::VersionedContent;
pub use crate::view::ReadOnlyView;
