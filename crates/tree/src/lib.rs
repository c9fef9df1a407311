pub mod consts;
pub mod error;
mod locale;
#[cfg(feature = "mock")]
pub mod mock;
mod node;
pub mod path;
mod pattern;
mod session;
mod value;
mod version;

pub use crate::locale::{Locale, Localized};
pub use crate::node::{Node, NodeHandle, NodeIter, RichNode};
pub use crate::pattern::NamePattern;
pub use crate::session::{Credentials, Repository, RepositoryHandle, Session, SessionHandle};
pub use crate::value::Value;
pub use crate::version::{HistoryHandle, Version, VersionHandle, VersionHistory, VersionIter};
