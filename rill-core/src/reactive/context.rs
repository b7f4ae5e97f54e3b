//! Scope Context
//!
//! The scope context tracks which node is the current *owner* (new nodes
//! attach to its ownership set) and which is the current *observer* (reads
//! record dependency edges against it). Recomputation sets both to the
//! recomputing node; `untrack` clears the observer; `create_root` sets only
//! the owner.
//!
//! # Implementation
//!
//! Both pointers live in a thread-local cell, so each thread that touches
//! the reactive API gets an independent context — there is no process-wide
//! global to cross-talk through. Scoped acquisition goes through
//! [`ScopeGuard`], which saves the previous pair on construction and
//! restores it on drop. Because guards live on the native call stack,
//! nesting behaves like a stack, and restoration is guaranteed on every
//! exit path including panics.

use std::cell::Cell;

use crate::graph::NodeId;

/// The dynamically-scoped owner/observer pair.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    owner: Option<NodeId>,
    observer: Option<NodeId>,
}

thread_local! {
    static SCOPE: Cell<Scope> = const { Cell::new(Scope { owner: None, observer: None }) };
}

/// The node new nodes should attach to, if any.
pub(crate) fn current_owner() -> Option<NodeId> {
    SCOPE.with(|scope| scope.get().owner)
}

/// The node reads should record edges against, if any.
pub(crate) fn current_observer() -> Option<NodeId> {
    SCOPE.with(|scope| scope.get().observer)
}

/// Guard that restores the previous scope when dropped.
pub(crate) struct ScopeGuard {
    saved: Scope,
}

impl ScopeGuard {
    /// Make `owner` the current owner for the guard's lifetime. The observer
    /// is left as-is.
    pub fn owner(owner: NodeId) -> Self {
        Self::swap(|scope| scope.owner = Some(owner))
    }

    /// Make `observer` (or no observer) the current tracking target for the
    /// guard's lifetime. The owner is left as-is.
    pub fn observer(observer: Option<NodeId>) -> Self {
        Self::swap(|scope| scope.observer = observer)
    }

    /// Make `node` both owner and observer, as recomputation does: the body
    /// creates child nodes and tracks reads as one logical unit.
    pub fn owner_and_observer(node: NodeId) -> Self {
        Self::swap(|scope| {
            scope.owner = Some(node);
            scope.observer = Some(node);
        })
    }

    fn swap(configure: impl FnOnce(&mut Scope)) -> Self {
        SCOPE.with(|cell| {
            let saved = cell.get();
            let mut next = saved;
            configure(&mut next);
            cell.set(next);
            Self { saved }
        })
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE.with(|cell| cell.set(self.saved));
    }
}
