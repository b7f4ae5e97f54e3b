//! Graph Nodes
//!
//! This module defines the computation node, the single vertex type of the
//! dependency graph. Signals, memos, effects, and disposal roots are all
//! `Node` instances distinguished by configuration — the `eager` flag and the
//! presence of an update closure — never by subtype.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;

/// Unique identifier for a node in the dependency graph.
///
/// Nodes are stored in an arena keyed by id and all edges between nodes are
/// id sets, so disposing a node is a matter of invalidating its id rather
/// than reasoning about shared-pointer lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Dirty state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// The node's value is up-to-date and can be trusted as-is.
    Clean,

    /// A transitive source may have changed, but no direct source has been
    /// confirmed changed yet. A stale node settles back to clean without
    /// recomputing when none of its inputs produced a new value.
    Stale,

    /// The node definitely needs to recompute before its value is trusted.
    Dirty,
}

/// Recompute closure carried by memo and effect nodes.
///
/// Returns whether the produced value differs from the previous one; a
/// changed result dirties the node's sinks.
pub type UpdateFn = Box<dyn FnMut() -> bool>;

/// A cleanup callback, run immediately before the owning node's next
/// recomputation and on disposal.
pub type CleanupFn = Box<dyn FnOnce()>;

/// A node in the dependency graph.
///
/// The node only governs *when* a value may be trusted; the value itself
/// lives outside the graph, in a cell shared between the owning primitive
/// handle and the node's update closure.
pub struct Node {
    /// Unique identifier for this node.
    id: NodeId,

    /// Current dirty state.
    state: NodeState,

    /// Eager nodes are enqueued for evaluation whenever they are dirtied.
    /// Lazy nodes (memos) recompute on next read instead.
    eager: bool,

    /// Nodes read during the last recomputation. Rebuilt from scratch on
    /// every recomputation.
    sources: IndexSet<NodeId>,

    /// Exact inverse of `sources` across the graph: the nodes that read this
    /// one during their last recomputation.
    sinks: IndexSet<NodeId>,

    /// Nodes created while this node was the current owner. Used only for
    /// hierarchical disposal, never for propagation.
    children: IndexSet<NodeId>,

    /// Cleanup callbacks, run in LIFO order.
    cleanups: VecDeque<CleanupFn>,

    /// The recompute closure; absent on signal-leaf and root nodes.
    update: Option<UpdateFn>,
}

impl Node {
    fn new(state: NodeState, eager: bool) -> Self {
        Self {
            id: NodeId::new(),
            state,
            eager,
            sources: IndexSet::new(),
            sinks: IndexSet::new(),
            children: IndexSet::new(),
            cleanups: VecDeque::new(),
            update: None,
        }
    }

    /// Create a signal-leaf node. Leaves hold externally written values and
    /// never recompute, so they start clean and stay clean.
    pub fn source() -> Self {
        Self::new(NodeState::Clean, true)
    }

    /// Create a memo node. Starts dirty so the first read computes.
    pub fn derived() -> Self {
        Self::new(NodeState::Dirty, false)
    }

    /// Create an effect node. Starts dirty and is scheduled eagerly.
    pub fn effect() -> Self {
        Self::new(NodeState::Dirty, true)
    }

    /// Create an owner-only node: a disposal boundary with no update and no
    /// observer semantics of its own.
    pub fn owner() -> Self {
        Self::new(NodeState::Clean, false)
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the current dirty state.
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Whether this node is scheduled eagerly when dirtied.
    pub fn eager(&self) -> bool {
        self.eager
    }

    /// Check if the node needs any processing.
    pub fn is_clean(&self) -> bool {
        self.state == NodeState::Clean
    }

    /// Mark the node as clean.
    pub fn mark_clean(&mut self) {
        self.state = NodeState::Clean;
    }

    /// Mark the node as stale (a transitive source may have changed).
    /// Never downgrades a node that is already known dirty.
    pub fn mark_stale(&mut self) {
        if self.state == NodeState::Clean {
            self.state = NodeState::Stale;
        }
    }

    /// Mark the node as definitely needing recomputation.
    pub fn mark_dirty(&mut self) {
        self.state = NodeState::Dirty;
    }

    /// Get the nodes this node read during its last recomputation.
    pub fn sources(&self) -> &IndexSet<NodeId> {
        &self.sources
    }

    /// Get the nodes that read this node during their last recomputation.
    pub fn sinks(&self) -> &IndexSet<NodeId> {
        &self.sinks
    }

    /// Get the nodes owned by this node.
    pub fn children(&self) -> &IndexSet<NodeId> {
        &self.children
    }

    /// Record a dependency (a node this node reads from). Idempotent.
    pub fn add_source(&mut self, id: NodeId) {
        self.sources.insert(id);
    }

    /// Remove a dependency.
    pub fn remove_source(&mut self, id: NodeId) {
        self.sources.swap_remove(&id);
    }

    /// Record a dependent (a node that reads from this one). Idempotent.
    pub fn add_sink(&mut self, id: NodeId) {
        self.sinks.insert(id);
    }

    /// Remove a dependent.
    pub fn remove_sink(&mut self, id: NodeId) {
        self.sinks.swap_remove(&id);
    }

    /// Record an owned node.
    pub fn add_child(&mut self, id: NodeId) {
        self.children.insert(id);
    }

    /// Take the full dependency set, leaving it empty.
    pub fn take_sources(&mut self) -> IndexSet<NodeId> {
        std::mem::take(&mut self.sources)
    }

    /// Take the full dependent set, leaving it empty.
    pub fn take_sinks(&mut self) -> IndexSet<NodeId> {
        std::mem::take(&mut self.sinks)
    }

    /// Take the ownership set, leaving it empty.
    pub fn take_children(&mut self) -> IndexSet<NodeId> {
        std::mem::take(&mut self.children)
    }

    /// Push a cleanup callback. Callbacks run in reverse registration order.
    pub fn push_cleanup(&mut self, cleanup: CleanupFn) {
        self.cleanups.push_back(cleanup);
    }

    /// Take the cleanup list, leaving it empty. The caller runs the entries
    /// back-to-front (LIFO).
    pub fn take_cleanups(&mut self) -> VecDeque<CleanupFn> {
        std::mem::take(&mut self.cleanups)
    }

    /// Install the recompute closure.
    pub fn set_update(&mut self, update: UpdateFn) {
        self.update = Some(update);
    }

    /// Take the recompute closure for invocation. The caller restores it once
    /// the run finishes; the closure is never invoked while the graph is
    /// borrowed.
    pub fn take_update(&mut self) -> Option<UpdateFn> {
        self.update.take()
    }

    /// Whether this node carries a recompute closure.
    pub fn has_update(&self) -> bool {
        self.update.is_some()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("eager", &self.eager)
            .field("sources", &self.sources.len())
            .field("sinks", &self.sinks.len())
            .field("children", &self.children.len())
            .field("cleanups", &self.cleanups.len())
            .field("has_update", &self.has_update())
            .finish()
    }
}
