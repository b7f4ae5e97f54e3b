//! Reactive Primitives
//!
//! This module implements the public reactive surface: signals, memos,
//! effects, and the owner-scope helpers that tie them together.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A [`Signal`] is a container for mutable state. When a signal is read
//! within a tracking context (a memo or effect body), the reader is
//! registered as a dependent. When the signal is written, dependents are
//! dirtied and affected effects re-run.
//!
//! ## Memos
//!
//! A [`Memo`] is a derived value that caches its result. It re-evaluates
//! lazily, on read, and only when one of its inputs was confirmed changed —
//! and it only propagates onward when its own result actually differs.
//!
//! ## Effects
//!
//! An [`Effect`] is a side-effecting computation that re-runs whenever its
//! dependencies change. Effects synchronize reactive state with the outside
//! world; the engine itself performs no I/O.
//!
//! ## Ownership
//!
//! Memos and effects must be created under an owner — a [`create_root`]
//! call, or the body of another memo/effect. Owners form a tree used purely
//! for teardown: disposing a root runs every [`on_cleanup`] callback in its
//! subtree and severs every edge, exactly once.
//!
//! # Implementation Notes
//!
//! Dependency tracking is automatic ("transparent reactivity", as in
//! SolidJS, Vue 3, and Leptos): a thread-local scope records which
//! computation is running, and reads register edges against it. Writes are
//! transactional — [`batch`] coalesces any number of writes into a single
//! propagation pass, and nested transactions are transparent.

mod context;
mod effect;
mod error;
mod memo;
mod runtime;
mod signal;

pub use effect::Effect;
pub use error::ReactiveError;
pub use memo::Memo;
pub use runtime::{batch, create_root, on_cleanup, untrack, Disposer};
pub use signal::{ReadSignal, Signal, WriteSignal};
