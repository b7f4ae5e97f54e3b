//! Memo Implementation
//!
//! A Memo is a cached derived value, recomputed lazily on read when its
//! inputs may have changed.
//!
//! # How Memos Work
//!
//! 1. The memo's node starts dirty; the first read computes and caches.
//!
//! 2. A confirmed change in a direct input dirties the node; a change
//!    further upstream only marks it stale.
//!
//! 3. On read, the node is resolved: its sources settle first, and a stale
//!    memo whose inputs all turned out unchanged is cleaned without
//!    recomputing. Memos that are never read stay dirty — no wasted work.
//!
//! 4. After recomputing, the new value is compared against the previous one
//!    (with `PartialEq` or a caller-supplied comparator). Only an unequal
//!    result dirties the memo's own dependents, so a memo that keeps
//!    producing the same value insulates everything downstream.
//!
//! Memos require an owner: they are created as children of the enclosing
//! root, effect, or memo, and are disposed with it.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use crate::graph::{Node, NodeId};

use super::context::{self, ScopeGuard};
use super::error::ReactiveError;
use super::runtime;

/// A cached derived value that recomputes only when its inputs change.
///
/// Handles are cheap to clone and share one cache and graph node.
pub struct Memo<T> {
    /// The graph node standing for this computation.
    id: NodeId,

    /// The cached value; `None` until the first evaluation.
    value: Rc<RefCell<Option<T>>>,
}

impl<T> Memo<T>
where
    T: Clone + 'static,
{
    /// Create a new memo with the given computation, comparing successive
    /// results with `PartialEq`.
    ///
    /// The computation does not run here; it runs on first read. Returns
    /// [`ReactiveError::NoActiveOwner`] outside an owner scope.
    pub fn new<F>(compute: F) -> Result<Self, ReactiveError>
    where
        F: FnMut() -> T + 'static,
        T: PartialEq,
    {
        Self::with_equality(compute, T::eq)
    }

    /// Create a new memo with a caller-supplied equality comparator.
    ///
    /// The comparator decides whether a recomputed value counts as changed;
    /// an equal result leaves the memo's dependents untouched even though
    /// the memo itself re-ran.
    pub fn with_equality<F, E>(mut compute: F, equals: E) -> Result<Self, ReactiveError>
    where
        F: FnMut() -> T + 'static,
        E: Fn(&T, &T) -> bool + 'static,
    {
        if context::current_owner().is_none() {
            return Err(ReactiveError::NoActiveOwner);
        }

        let mut node = Node::derived();
        let id = node.id();
        let value: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));

        let cache = Rc::clone(&value);
        node.set_update(Box::new(move || {
            let next = {
                // The body both creates child nodes and tracks reads
                // against this memo.
                let _scope = ScopeGuard::owner_and_observer(id);
                compute()
            };
            let mut slot = cache.borrow_mut();
            let changed = match slot.as_ref() {
                Some(previous) => !equals(&next, previous),
                // The first evaluation always counts as a change.
                None => true,
            };
            *slot = Some(next);
            changed
        }));

        runtime::register(node);
        Ok(Self { id, value })
    }

    /// Get the memo's graph node ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the current value, recomputing if necessary.
    ///
    /// Records a dependency against the current observer, then resolves the
    /// node (lazy pull: upstream memos settle first, and the memo only
    /// recomputes when a direct input was confirmed changed).
    pub fn get(&self) -> T {
        runtime::track_read(self.id);
        runtime::resolve(self.id);
        self.value
            .borrow()
            .clone()
            .expect("resolved memo holds a value")
    }

    /// Get the current value without recording a dependency.
    pub fn get_untracked(&self) -> T {
        runtime::resolve(self.id);
        self.value
            .borrow()
            .clone()
            .expect("resolved memo holds a value")
    }

    /// Whether the memo has evaluated at least once.
    pub fn has_value(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Get the number of inputs recorded by the last evaluation.
    pub fn dependency_count(&self) -> usize {
        runtime::with(|sched| {
            sched
                .node(self.id)
                .map(|node| node.sources().len())
                .unwrap_or(0)
        })
    }

    /// Get the number of nodes currently depending on this memo.
    pub fn dependent_count(&self) -> usize {
        runtime::with(|sched| {
            sched
                .node(self.id)
                .map(|node| node.sinks().len())
                .unwrap_or(0)
        })
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.id)
            .field("has_value", &self.has_value())
            .field("dependency_count", &self.dependency_count())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
