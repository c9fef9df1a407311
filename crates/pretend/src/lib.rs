//! Frozen version content, presented as live content.
//!
//! A version store keeps each check-in as a subtree of frozen nodes: every
//! node in it has the structural type `nt:frozenNode` and records the type it
//! really had in `jcr:frozenPrimaryType`. Code written against live content
//! dispatches on primary types and walks children, so it cannot read frozen
//! content directly. [`pretend()`] wraps a frozen node in a [`PretenderNode`]
//! that reports the real type and wraps every child it hands out, so the
//! whole subtree reads like the live document did at check-in time.

mod pretender;

pub use crate::pretender::{Capability, PretenderNode, pretend};
