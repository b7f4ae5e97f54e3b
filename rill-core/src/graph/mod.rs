//! Dependency Graph
//!
//! This module implements the dependency graph that tracks relationships
//! between reactive values and computations.
//!
//! # Overview
//!
//! The graph is a DAG of [`Node`]s where:
//!
//! - Every reactive entity — signal, memo, effect, root — is one node,
//!   distinguished by configuration rather than subtype
//! - `sources`/`sinks` edges carry dependency propagation
//! - `children` edges carry ownership, used only for disposal
//!
//! When a value is confirmed changed we traverse sink edges to mark the
//! affected subgraph (direct dependents dirty, transitive dependents stale),
//! and the scheduler's pending set collects the eager nodes that must be
//! evaluated at the end of the current transaction.
//!
//! # Design Decisions
//!
//! 1. Nodes live in a centralized arena indexed by id, and edges are id
//!    sets. Back-edges (sources/sinks, owner/children) are unproblematic
//!    because no node owns another in the Rust sense; disposal invalidates
//!    ids instead of chasing shared pointers.
//!
//! 2. We maintain both forward (sources) and reverse (sinks) edges as exact
//!    inverses to enable efficient traversal in both directions.
//!
//! 3. Structural mutation lives here, closure invocation does not: the
//!    scheduler never calls user code, so every method is a plain `&mut`
//!    operation. The driver in `reactive::runtime` interleaves the two.

mod node;
mod scheduler;

pub use node::{NodeId, NodeState};

pub(crate) use node::{CleanupFn, Node, UpdateFn};
pub(crate) use scheduler::Scheduler;
