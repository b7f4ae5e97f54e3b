//! Update Scheduler
//!
//! The scheduler owns the node arena, the transaction-nesting counter, and
//! the pending set of eager nodes awaiting evaluation (the flush cursor).
//!
//! Everything in this module is a plain structural operation on the graph —
//! edge maintenance, dirty propagation, detachment — expressed as `&mut self`
//! methods that never invoke a user closure. That keeps the module
//! independently testable; the re-entrant driver that runs update and cleanup
//! closures lives in `reactive::runtime`.
//!
//! # Propagation
//!
//! Dirtying is two-phase:
//!
//! 1. When a node's value is confirmed changed (a signal write, or a memo
//!    recomputing to a different result), its direct sinks become `Dirty`.
//! 2. Everything further downstream becomes `Stale`: possibly affected, but
//!    not yet confirmed.
//!
//! A stale node whose inputs all settle unchanged is cleaned without
//! recomputing. This is what keeps diamond-shaped graphs from re-running a
//! dependent once per path: only a confirmed value change escalates
//! staleness into work.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;
use smallvec::SmallVec;

use super::node::{CleanupFn, Node, NodeId, NodeState};

/// The scheduler: node arena plus flush bookkeeping.
pub struct Scheduler {
    /// All live nodes, indexed by ID. Disposal removes entries; ids are
    /// never reused.
    nodes: HashMap<NodeId, Node>,

    /// Eager nodes awaiting resolution in the next flush round.
    pending: IndexSet<NodeId>,

    /// Transaction nesting depth. Propagation only runs when the outermost
    /// transaction closes.
    transaction_depth: usize,
}

impl Scheduler {
    /// Create a new empty scheduler.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            pending: IndexSet::new(),
            transaction_depth: 0,
        }
    }

    /// Add a node to the graph.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    /// Get a reference to a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Whether a node is still live.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get the total number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert the bidirectional dependency edge `observer reads source`.
    ///
    /// Both halves are inserted or neither: the sink set must stay the exact
    /// inverse of the source set. Idempotent, and a no-op when either node is
    /// gone or the edge would be a self-loop.
    pub fn add_edge(&mut self, source: NodeId, observer: NodeId) {
        if source == observer {
            return;
        }
        if !self.nodes.contains_key(&source) || !self.nodes.contains_key(&observer) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&observer) {
            node.add_source(source);
        }
        if let Some(node) = self.nodes.get_mut(&source) {
            node.add_sink(observer);
        }
    }

    /// Record `child` in `owner`'s ownership set.
    pub fn attach_child(&mut self, owner: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&owner) {
            node.add_child(child);
        }
    }

    /// Push a cleanup callback onto `owner`'s LIFO list.
    pub fn push_cleanup(&mut self, owner: NodeId, cleanup: CleanupFn) {
        if let Some(node) = self.nodes.get_mut(&owner) {
            node.push_cleanup(cleanup);
        }
    }

    /// Propagate a confirmed value change at `id` to its dependents.
    ///
    /// Direct sinks become dirty (an already-stale sink is escalated);
    /// transitive sinks become stale. Eager nodes are enqueued as they are
    /// marked. The clean/stale checks stop re-entry into already-marked
    /// subgraphs, bounding each call to O(edges).
    pub fn mark_dependents(&mut self, id: NodeId) {
        let direct: SmallVec<[NodeId; 8]> = match self.nodes.get(&id) {
            Some(node) => node.sinks().iter().copied().collect(),
            None => return,
        };

        // Worklist for the stale wave; recursion depth is unbounded on deep
        // dependency chains, an explicit stack is not.
        let mut stale_wave: SmallVec<[NodeId; 8]> = SmallVec::new();

        for sink_id in direct {
            let Some(sink) = self.nodes.get_mut(&sink_id) else {
                continue;
            };
            let eager = sink.eager();
            match sink.state() {
                NodeState::Dirty => continue,
                // Downstream was already marked stale when this sink was.
                NodeState::Stale => sink.mark_dirty(),
                NodeState::Clean => {
                    sink.mark_dirty();
                    stale_wave.extend(sink.sinks().iter().copied());
                }
            }
            if eager {
                self.pending.insert(sink_id);
            }
        }

        while let Some(next_id) = stale_wave.pop() {
            let Some(node) = self.nodes.get_mut(&next_id) else {
                continue;
            };
            if node.state() != NodeState::Clean {
                continue;
            }
            node.mark_stale();
            let eager = node.eager();
            stale_wave.extend(node.sinks().iter().copied());
            if eager {
                self.pending.insert(next_id);
            }
        }
    }

    /// Enqueue an eager node for the next flush round.
    pub fn enqueue(&mut self, id: NodeId) {
        self.pending.insert(id);
    }

    /// Take the current flush round, leaving the pending set empty for
    /// enqueues performed while the round resolves.
    pub fn take_pending(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Whether any eager node awaits resolution.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Open a (possibly nested) transaction.
    pub fn begin_transaction(&mut self) {
        self.transaction_depth += 1;
    }

    /// Close the innermost transaction.
    pub fn end_transaction(&mut self) {
        debug_assert!(self.transaction_depth > 0, "transaction depth underflow");
        self.transaction_depth = self.transaction_depth.saturating_sub(1);
    }

    /// Current transaction nesting depth.
    pub fn transaction_depth(&self) -> usize {
        self.transaction_depth
    }

    /// Detach a node from the graph, returning its cleanup callbacks and
    /// owned children for the caller to process.
    ///
    /// Always severs the node's source edges (removing it from each source's
    /// sink set). With `remove` the node's sink edges are severed too and the
    /// node leaves the arena — full disposal, after which nothing in the
    /// graph can reach it. Without `remove` the node stays and keeps its
    /// dependents: the pre-recomputation cleanup pass.
    ///
    /// Returns `None` when the node is already gone.
    pub fn detach(
        &mut self,
        id: NodeId,
        remove: bool,
    ) -> Option<(VecDeque<CleanupFn>, IndexSet<NodeId>)> {
        let (sources, sinks, cleanups, children) = {
            let node = self.nodes.get_mut(&id)?;
            (
                node.take_sources(),
                if remove { Some(node.take_sinks()) } else { None },
                node.take_cleanups(),
                node.take_children(),
            )
        };

        for source_id in &sources {
            if let Some(source) = self.nodes.get_mut(source_id) {
                source.remove_sink(id);
            }
        }

        if let Some(sinks) = sinks {
            for sink_id in &sinks {
                if let Some(sink) = self.nodes.get_mut(sink_id) {
                    sink.remove_source(id);
                }
            }
            self.nodes.remove(&id);
            // A queued flush entry for a removed node must never run.
            self.pending.swap_remove(&id);
            tracing::trace!(node = id.raw(), "node removed from graph");
        }

        Some((cleanups, children))
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
