//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals, memos, and
//! effects. It owns the thread-local engine instance and implements the
//! operations that interleave graph mutation with user closures: node
//! resolution, the transactional flush loop, and subtree disposal. It also
//! hosts the owner-scope entry points of the public API: [`create_root`],
//! [`on_cleanup`], [`untrack`], and [`batch`].
//!
//! # How It Works
//!
//! 1. A primitive mutation (signal write, effect creation, explicit
//!    [`batch`]) opens a transaction. Nested transactions are transparent:
//!    only the outermost one triggers propagation, so writes inside an
//!    already-open transaction coalesce.
//!
//! 2. Dirty propagation enqueues affected eager nodes into the scheduler's
//!    pending set.
//!
//! 3. When the outermost transaction closes, [`flush`] resolves pending
//!    nodes round by round until a fixpoint: resolving an effect may write
//!    further signals, which enqueues further work.
//!
//! 4. Resolution recomputes a node only after its sources have settled, so
//!    recomputation order always respects dependency order.
//!
//! # Borrow discipline
//!
//! The engine state sits in a thread-local `RefCell`. Every user closure —
//! update bodies, cleanup callbacks — re-enters the runtime (reads track
//! edges, writes open transactions), so closures are always invoked
//! *between* borrows: graph state is read or mutated in one short borrow,
//! the borrow is released, then the closure runs.

use std::cell::RefCell;

use smallvec::{smallvec, SmallVec};

use crate::graph::{Node, NodeId, NodeState, Scheduler, UpdateFn};

use super::context::{self, ScopeGuard};
use super::error::ReactiveError;

thread_local! {
    static RUNTIME: RefCell<Scheduler> = RefCell::new(Scheduler::new());
}

/// Run `f` with mutable access to the thread's scheduler.
///
/// Callers must not invoke user closures while the borrow is held.
pub(crate) fn with<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    RUNTIME.with(|runtime| f(&mut runtime.borrow_mut()))
}

/// Insert a freshly configured node into the graph, attaching it to the
/// current owner's ownership set when one is active.
pub(crate) fn register(node: Node) -> NodeId {
    let id = node.id();
    with(|sched| {
        sched.insert(node);
        if let Some(owner) = context::current_owner() {
            sched.attach_child(owner, id);
        }
    });
    id
}

/// Record a read of `source` against the current observer, if any.
///
/// Untracked reads (no active observer) record nothing.
pub(crate) fn track_read(source: NodeId) {
    if let Some(observer) = context::current_observer() {
        with(|sched| sched.add_edge(source, observer));
    }
}

/// Run `f` inside a transaction; flush when the outermost one closes.
///
/// The depth counter is decremented on every exit path, but a panicking `f`
/// skips the flush: pending work is left exactly as it was.
pub(crate) fn run_in_transaction<R>(f: impl FnOnce() -> R) -> R {
    struct DepthGuard;

    impl Drop for DepthGuard {
        fn drop(&mut self) {
            with(|sched| sched.end_transaction());
        }
    }

    with(|sched| sched.begin_transaction());
    let result = {
        let _guard = DepthGuard;
        f()
    };
    if with(|sched| sched.transaction_depth() == 0) {
        flush();
    }
    result
}

/// Worklist fixpoint: resolve pending eager nodes round by round until no
/// round enqueues more.
///
/// A signal write performed by a resolving effect re-enters
/// `run_in_transaction` at depth zero and therefore flushes recursively; the
/// outer loop then finds its remaining rounds already drained.
fn flush() {
    loop {
        let round = with(|sched| sched.take_pending());
        if round.is_empty() {
            break;
        }
        tracing::trace!(nodes = round.len(), "flush round");
        for id in round {
            resolve(id);
        }
    }
}

/// Restores a node's update closure even when the closure panics, so a
/// failed recomputation leaves the node recomputable.
struct UpdateGuard {
    id: NodeId,
    update: Option<UpdateFn>,
}

impl Drop for UpdateGuard {
    fn drop(&mut self) {
        if let Some(update) = self.update.take() {
            with(|sched| {
                if let Some(node) = sched.node_mut(self.id) {
                    node.set_update(update);
                }
            });
        }
    }
}

/// Ensure `id` is clean, recomputing it (and anything upstream of it) as
/// needed. A no-op for clean or disposed nodes.
pub(crate) fn resolve(id: NodeId) {
    // Sources settle first: a node must never recompute while an input it
    // read last time is still unsettled.
    let sources = with(|sched| match sched.node(id) {
        Some(node) if !node.is_clean() => {
            Some(node.sources().iter().copied().collect::<SmallVec<[NodeId; 8]>>())
        }
        _ => None,
    });
    let Some(sources) = sources else {
        return;
    };
    for source in sources {
        let unsettled = with(|sched| sched.node(source).is_some_and(|node| !node.is_clean()));
        if unsettled {
            resolve(source);
        }
    }

    // Resolving a source may have escalated this node from stale to dirty,
    // or disposed it outright.
    enum Step {
        Done,
        Settle,
        Recompute(Option<UpdateFn>),
    }

    let step = with(|sched| match sched.node_mut(id) {
        None => Step::Done,
        Some(node) => match node.state() {
            NodeState::Clean => Step::Done,
            NodeState::Stale => Step::Settle,
            NodeState::Dirty => Step::Recompute(node.take_update()),
        },
    });

    match step {
        Step::Done => {}
        // No direct source was confirmed changed: trust the cached value.
        Step::Settle => with(|sched| {
            if let Some(node) = sched.node_mut(id) {
                node.mark_clean();
            }
        }),
        Step::Recompute(update) => {
            let changed = match update {
                Some(update) => {
                    // Tear down last run's subscriptions, cleanups, and
                    // owned nodes before rebuilding them.
                    cleanup_before_update(id);
                    let mut guard = UpdateGuard {
                        id,
                        update: Some(update),
                    };
                    match guard.update.as_mut() {
                        Some(update) => update(),
                        None => false,
                    }
                }
                // Signal leaves carry no update and are never dirtied, so
                // this arm only settles owner-only nodes.
                None => false,
            };
            with(|sched| {
                if let Some(node) = sched.node_mut(id) {
                    node.mark_clean();
                }
            });
            if changed {
                with(|sched| sched.mark_dependents(id));
            }
        }
    }
}

/// Tear down `id` and everything it transitively owns: sever all edges in
/// both directions, run cleanups, and remove the nodes from the graph.
pub(crate) fn dispose(id: NodeId) {
    teardown(id, true);
}

/// Pre-recomputation cleanup: sever the node's own stale input edges, run
/// its cleanups, and dispose everything it created during its previous run.
/// The node itself stays in the graph and keeps its dependents.
fn cleanup_before_update(id: NodeId) {
    teardown(id, false);
}

fn teardown(id: NodeId, dispose_self: bool) {
    let mut stack: SmallVec<[(NodeId, bool); 8]> = smallvec![(id, dispose_self)];
    while let Some((at, remove)) = stack.pop() {
        let Some((mut cleanups, children)) = with(|sched| sched.detach(at, remove)) else {
            continue;
        };
        for child in children {
            stack.push((child, true));
        }
        // LIFO, and outside the scheduler borrow: a cleanup may re-enter the
        // runtime (write a signal, dispose another root).
        while let Some(cleanup) = cleanups.pop_back() {
            cleanup();
        }
    }
}

/// Handle that tears down a reactive tree created by [`create_root`].
#[derive(Debug, Clone, Copy)]
pub struct Disposer {
    id: NodeId,
}

impl Disposer {
    /// Dispose the root and every node created under it. Every cleanup
    /// registered in the subtree runs exactly once; afterwards no node of
    /// the subtree is reachable from any surviving node. Idempotent.
    pub fn dispose(self) {
        tracing::debug!(root = self.id.raw(), "disposing reactive root");
        dispose(self.id);
    }
}

/// Create a top-level reactive tree.
///
/// `f` runs with a fresh owner-only node as the current owner and receives
/// the [`Disposer`] that tears the tree down. This is the sole entry point
/// for creating owners and the only way to release what they own; a root
/// that is never disposed lives for the duration of the thread.
///
/// Roots are disposal boundaries, not dependencies: a root nested inside
/// another owner is deliberately *not* attached to it and must be disposed
/// on its own.
pub fn create_root<R>(f: impl FnOnce(Disposer) -> R) -> R {
    let node = Node::owner();
    let id = node.id();
    with(|sched| {
        sched.insert(node);
    });
    let _scope = ScopeGuard::owner(id);
    f(Disposer { id })
}

/// Register a cleanup callback on the current owner.
///
/// The callback runs immediately before the owner's next recomputation, or
/// when the owner is disposed — whichever comes first — and runs exactly
/// once. Callbacks registered together run in reverse registration order.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> Result<(), ReactiveError> {
    let owner = context::current_owner().ok_or(ReactiveError::NoActiveOwner)?;
    with(|sched| sched.push_cleanup(owner, Box::new(f)));
    Ok(())
}

/// Run `f` with no observer: signal and memo reads inside record no
/// dependency edges.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _scope = ScopeGuard::observer(None);
    f()
}

/// Coalesce any number of writes into a single propagation pass.
///
/// Affected effects run once when the outermost `batch` returns, not once
/// per write. Reads inside see values already written within the batch.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    run_in_transaction(f)
}
