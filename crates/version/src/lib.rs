//! Version resolution.
//!
//! Given a document, find the node whose history is tracked and pick the
//! version that was in effect at an instant. Only linear histories are
//! considered, and store failures are returned unchanged.

mod resolve;

pub use crate::resolve::{
    Resolution, all_linear_versions, find_versionable_node, has_live_frozen_node, resolve, resolve_outcome,
    root_version, version_as_of,
};
