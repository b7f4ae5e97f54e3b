//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive: a mutable cell whose
//! reads are tracked and whose writes propagate.
//!
//! # How Signals Work
//!
//! 1. When a signal is read while an observer is active (inside a memo or
//!    effect body), a dependency edge is recorded from the observer to the
//!    signal's node.
//!
//! 2. When a signal is written, its direct dependents are dirtied and its
//!    transitive dependents marked stale, inside a transaction; affected
//!    effects run when the outermost transaction closes.
//!
//! 3. Writes are unconditional: setting a signal to the value it already
//!    holds still dirties dependents. Equality cutoffs belong to memos.
//!
//! The signal's node never recomputes — it is a leaf that stays clean; the
//! graph only uses it as the origin of propagation.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use crate::graph::{Node, NodeId};

use super::runtime;

/// A reactive cell holding a value of type `T`.
///
/// Handles are cheap to clone and share one underlying cell and graph node.
/// Like every primitive in this crate, signals are single-threaded by
/// design: handles are `!Send` and `!Sync`.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// // Read the value (tracked when an observer is active)
/// let value = count.get();
///
/// // Update the value (dirties and schedules dependents)
/// count.set(5);
/// ```
pub struct Signal<T> {
    /// The graph node standing for this cell.
    id: NodeId,

    /// The current value. Lives outside the graph; the node only governs
    /// propagation.
    value: Rc<RefCell<T>>,
}

impl<T> Signal<T>
where
    T: Clone + 'static,
{
    /// Create a new signal with the given initial value.
    ///
    /// The node attaches to the current owner when one is active, so
    /// disposing that owner retires the signal; a signal created outside
    /// any owner lives for the duration of the thread.
    pub fn new(value: T) -> Self {
        let id = runtime::register(Node::source());
        Self {
            id,
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// Get the signal's graph node ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the current value.
    ///
    /// If called while an observer is active, also records the observer's
    /// dependency on this signal.
    pub fn get(&self) -> T {
        runtime::track_read(self.id);
        self.value.borrow().clone()
    }

    /// Get the current value without recording a dependency.
    pub fn get_untracked(&self) -> T {
        self.value.borrow().clone()
    }

    /// Set a new value and propagate to dependents.
    ///
    /// Runs inside a transaction: consecutive sets outside a [`batch`]
    /// each trigger their own flush, sets inside one coalesce. The write is
    /// unconditional — no equality short-circuit.
    ///
    /// [`batch`]: crate::batch
    pub fn set(&self, value: T) {
        runtime::run_in_transaction(|| {
            *self.value.borrow_mut() = value;
            runtime::with(|sched| sched.mark_dependents(self.id));
        });
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let current = self.value.borrow();
            f(&current)
        };
        self.set(next);
    }

    /// Split into the accessor/setter handle pair.
    pub fn split(&self) -> (ReadSignal<T>, WriteSignal<T>) {
        (
            ReadSignal {
                inner: self.clone(),
            },
            WriteSignal {
                inner: self.clone(),
            },
        )
    }

    /// Get the number of nodes currently depending on this signal.
    pub fn subscriber_count(&self) -> usize {
        runtime::with(|sched| {
            sched
                .node(self.id)
                .map(|node| node.sinks().len())
                .unwrap_or(0)
        })
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Read half of a split signal. See [`Signal::split`].
pub struct ReadSignal<T> {
    inner: Signal<T>,
}

impl<T> ReadSignal<T>
where
    T: Clone + 'static,
{
    /// Get the current value, recording a dependency against the current
    /// observer.
    pub fn get(&self) -> T {
        self.inner.get()
    }

    /// Get the current value without recording a dependency.
    pub fn get_untracked(&self) -> T {
        self.inner.get_untracked()
    }

    /// Get the signal's graph node ID.
    pub fn id(&self) -> NodeId {
        self.inner.id()
    }
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Write half of a split signal. See [`Signal::split`].
pub struct WriteSignal<T> {
    inner: Signal<T>,
}

impl<T> WriteSignal<T>
where
    T: Clone + 'static,
{
    /// Set a new value and propagate to dependents.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        self.inner.update(f);
    }

    /// Get the signal's graph node ID.
    pub fn id(&self) -> NodeId {
        self.inner.id()
    }
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
