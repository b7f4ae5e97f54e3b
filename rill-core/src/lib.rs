//! Rill Core
//!
//! This crate provides the core engine for the Rill fine-grained reactive
//! system. It implements:
//!
//! - Reactive primitives (signals, memos, effects)
//! - Automatic dependency tracking with exact-inverse edge maintenance
//! - A transactional scheduler that flushes change through exactly the
//!   affected subgraph
//! - Ownership-based disposal with LIFO cleanups
//!
//! The engine is domain-agnostic: it contains no rendering, I/O, or UI
//! binding of any kind. It is also deliberately single-threaded — each
//! thread that touches the API gets its own independent graph, and handles
//! are `!Send`/`!Sync`.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `graph`: the dependency graph — nodes, edge maintenance, dirty
//!   propagation, and flush bookkeeping
//! - `reactive`: the primitives and the runtime driver that recomputes
//!   nodes and runs user closures
//!
//! # Example
//!
//! ```rust,ignore
//! use rill_core::{create_root, Effect, Memo, Signal};
//!
//! create_root(|dispose| {
//!     let count = Signal::new(1);
//!
//!     let doubled = {
//!         let count = count.clone();
//!         Memo::new(move || count.get() * 2)?
//!     };
//!
//!     {
//!         let doubled = doubled.clone();
//!         Effect::new(move || println!("doubled = {}", doubled.get()))?;
//!     }
//!     // prints: "doubled = 2"
//!
//!     count.set(5);
//!     // prints: "doubled = 10"
//!
//!     dispose.dispose();
//!     count.set(9); // nothing prints
//!     Ok::<(), rill_core::ReactiveError>(())
//! })
//! .unwrap();
//! ```

pub mod graph;
pub mod reactive;

pub use reactive::{
    batch, create_root, on_cleanup, untrack, Disposer, Effect, Memo, ReactiveError, ReadSignal,
    Signal, WriteSignal,
};
