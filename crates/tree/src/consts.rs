//! Well-known node type, property and version names.

/// Structural type of every node inside a version's frozen subtree.
pub const FROZEN_NODE: &str = "nt:frozenNode";
/// Property on a frozen node holding the primary type the live node had.
pub const FROZEN_PRIMARY_TYPE: &str = "jcr:frozenPrimaryType";
/// Property on a frozen node holding the mixin types the live node had.
pub const FROZEN_MIXIN_TYPES: &str = "jcr:frozenMixinTypes";

/// Fallback type every node is an instance of.
pub const BASE: &str = "nt:base";
/// Mixin marking a node whose history is tracked independently.
pub const VERSIONABLE: &str = "mix:versionable";

/// Container node representing one logical document.
pub const HANDLE: &str = "hippo:handle";
/// Document variants taking part in the publication workflow.
pub const PUBLISHABLE: &str = "hippostd:publishable";
/// Lifecycle state of a document variant.
pub const STATE: &str = "hippostd:state";
/// Lifecycle state of the working copy, which is the variant that gets versioned.
pub const UNPUBLISHED: &str = "unpublished";
/// Summary of the publication state at the time the variant was saved.
pub const STATE_SUMMARY: &str = "hippostd:stateSummary";
/// State summary of a fully valid, published save.
pub const LIVE: &str = "live";

/// Name of the marker version created when versioning is first enabled.
pub const ROOT_VERSION: &str = "jcr:rootVersion";
/// Name of the frozen node within a version.
pub const FROZEN_NODE_NAME: &str = "jcr:frozenNode";
