//! Effect Implementation
//!
//! An Effect is a side-effecting subscriber that re-runs eagerly whenever a
//! dependency changes.
//!
//! # How Effects Work
//!
//! 1. Creation enqueues the effect inside a transaction, so its body runs
//!    once synchronously (when the enclosing transaction closes, or
//!    immediately when there is none) and establishes the initial
//!    dependencies.
//!
//! 2. When a dependency's value is confirmed changed the effect is dirtied
//!    and enqueued; the flush at the end of the transaction re-runs it, after
//!    every memo it reads has settled. An effect whose upstream turned out
//!    unchanged settles without running.
//!
//! 3. Before each re-run the previous run is torn down: stale subscription
//!    edges are severed, cleanups registered via
//!    [`on_cleanup`](super::on_cleanup) run in LIFO order, and nodes created
//!    by the previous run (nested effects, memos, owned signals) are
//!    disposed.
//!
//! # Differences from Memo
//!
//! - Memos produce a value; effects do not.
//! - Memos are lazy (recompute on read); effects are eager (scheduled on
//!   dirtying).
//! - A memo's output feeds change detection; an effect always reports "no
//!   further propagation".
//!
//! Effects require an owner and are torn down when their owner is disposed.

use std::fmt;

use crate::graph::{Node, NodeId};

use super::context::{self, ScopeGuard};
use super::error::ReactiveError;
use super::runtime;

/// A side-effecting computation that re-runs when its dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
/// let tracked = count.clone();
///
/// Effect::new(move || {
///     println!("count is {}", tracked.get());
/// })?;
///
/// count.set(5); // prints: "count is 5"
/// ```
#[derive(Clone, Copy)]
pub struct Effect {
    /// The graph node standing for this subscriber.
    id: NodeId,
}

impl Effect {
    /// Create a new effect.
    ///
    /// The body runs once synchronously to establish its dependencies.
    /// Returns [`ReactiveError::NoActiveOwner`] outside an owner scope.
    pub fn new<F>(mut body: F) -> Result<Self, ReactiveError>
    where
        F: FnMut() + 'static,
    {
        if context::current_owner().is_none() {
            return Err(ReactiveError::NoActiveOwner);
        }

        let mut node = Node::effect();
        let id = node.id();
        node.set_update(Box::new(move || {
            let _scope = ScopeGuard::owner_and_observer(id);
            body();
            // Effects have no comparable output; never propagate further.
            false
        }));

        runtime::register(node);
        runtime::run_in_transaction(|| {
            runtime::with(|sched| sched.enqueue(id));
        });
        Ok(Self { id })
    }

    /// Get the effect's graph node ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the number of dependencies recorded by the last run.
    pub fn dependency_count(&self) -> usize {
        runtime::with(|sched| {
            sched
                .node(self.id)
                .map(|node| node.sources().len())
                .unwrap_or(0)
        })
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("dependency_count", &self.dependency_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
