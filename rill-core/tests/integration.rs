//! Integration Tests for the Reactive Engine
//!
//! These tests exercise signals, memos, effects, and disposal together,
//! through the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rill_core::{batch, create_root, on_cleanup, untrack, Effect, Memo, ReactiveError, Signal};

/// The canonical end-to-end scenario: signal -> memo -> effect, one write,
/// one disposal.
#[test]
fn signal_memo_effect_roundtrip() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let signal = Signal::new(1);
    let writer = signal.clone();

    let dispose = create_root(|dispose| {
        let input = signal.clone();
        let doubled = Memo::new(move || input.get() * 2).unwrap();

        let sink = Rc::clone(&log);
        Effect::new(move || {
            sink.borrow_mut().push(doubled.get().to_string());
        })
        .unwrap();

        dispose
    });

    // Ran once at creation, after the memo settled.
    assert_eq!(log.borrow().as_slice(), ["2"]);

    writer.set(5);
    assert_eq!(log.borrow().as_slice(), ["2", "10"]);

    dispose.dispose();
    writer.set(9);
    // Nothing after disposal, and no duplicate or intermediate entries.
    assert_eq!(log.borrow().as_slice(), ["2", "10"]);
}

/// Writing one signal must run a diamond-shaped dependent exactly once, with
/// both memo branches already settled.
#[test]
fn diamond_propagation_is_glitch_free() {
    create_root(|_| {
        let source = Signal::new(1);
        let (left_in, right_in) = (source.clone(), source.clone());

        let left = Memo::new(move || left_in.get() + 1).unwrap();
        let right = Memo::new(move || right_in.get() * 10).unwrap();

        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        Effect::new(move || {
            sink.borrow_mut().push((left.get(), right.get()));
        })
        .unwrap();

        assert_eq!(observed.borrow().as_slice(), [(2, 10)]);

        source.set(3);

        // One re-run, never a half-updated pair like (4, 10) or (2, 30).
        assert_eq!(observed.borrow().as_slice(), [(2, 10), (4, 30)]);
    });
}

/// Several writes inside a batch coalesce into one propagation pass.
#[test]
fn batch_coalesces_writes() {
    create_root(|_| {
        let a = Signal::new(0);
        let b = Signal::new(0);
        let (a_in, b_in) = (a.clone(), b.clone());

        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        Effect::new(move || {
            counter.set(counter.get() + 1);
            a_in.get();
            b_in.get();
        })
        .unwrap();
        assert_eq!(runs.get(), 1);

        batch(|| {
            a.set(1);
            a.set(2);
            b.set(3);
        });
        assert_eq!(runs.get(), 2);

        // Unbatched writes flush individually.
        a.set(4);
        b.set(5);
        assert_eq!(runs.get(), 4);
    });
}

/// A memo that recomputes to an equal value must not re-run the effects
/// behind it.
#[test]
fn unchanged_memo_insulates_downstream_effects() {
    create_root(|_| {
        let signal = Signal::new(2);
        let input = signal.clone();

        let memo_runs = Rc::new(Cell::new(0));
        let memo_counter = Rc::clone(&memo_runs);
        let parity = Memo::new(move || {
            memo_counter.set(memo_counter.get() + 1);
            input.get() % 2
        })
        .unwrap();

        let effect_runs = Rc::new(Cell::new(0));
        let effect_counter = Rc::clone(&effect_runs);
        Effect::new(move || {
            effect_counter.set(effect_counter.get() + 1);
            parity.get();
        })
        .unwrap();
        assert_eq!((memo_runs.get(), effect_runs.get()), (1, 1));

        // Same parity: the memo re-runs, the effect settles without running.
        signal.set(4);
        assert_eq!((memo_runs.get(), effect_runs.get()), (2, 1));

        signal.set(5);
        assert_eq!((memo_runs.get(), effect_runs.get()), (3, 2));
    });
}

/// Signals have no equality short-circuit: a same-value write still re-runs
/// direct dependents.
#[test]
fn same_value_write_still_propagates() {
    create_root(|_| {
        let signal = Signal::new(1);
        let input = signal.clone();
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);

        Effect::new(move || {
            counter.set(counter.get() + 1);
            input.get();
        })
        .unwrap();

        signal.set(1);
        signal.set(1);
        assert_eq!(runs.get(), 3);
    });
}

/// After each run an effect depends on exactly what it read during that run;
/// edges from earlier runs are gone.
#[test]
fn dependencies_follow_the_last_run() {
    create_root(|_| {
        let use_first = Signal::new(true);
        let first = Signal::new("a");
        let second = Signal::new("b");
        let (toggle, first_in, second_in) = (use_first.clone(), first.clone(), second.clone());

        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        Effect::new(move || {
            counter.set(counter.get() + 1);
            if toggle.get() {
                first_in.get();
            } else {
                second_in.get();
            }
        })
        .unwrap();
        assert_eq!(runs.get(), 1);

        // Only the branch actually read is subscribed.
        second.set("b2");
        assert_eq!(runs.get(), 1);

        use_first.set(false);
        assert_eq!(runs.get(), 2);

        // The stale edge to `first` was severed by the re-run.
        first.set("a2");
        assert_eq!(runs.get(), 2);
        assert_eq!(first.subscriber_count(), 0);

        second.set("b3");
        assert_eq!(runs.get(), 3);
    });
}

/// Reads inside `untrack` create no edges, but still see current values.
#[test]
fn untracked_reads_are_isolated() {
    create_root(|_| {
        let tracked = Signal::new(1);
        let ambient = Signal::new(10);
        let (tracked_in, ambient_in) = (tracked.clone(), ambient.clone());

        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        Effect::new(move || {
            let sum = tracked_in.get() + untrack(|| ambient_in.get());
            sink.borrow_mut().push(sum);
        })
        .unwrap();
        assert_eq!(observed.borrow().as_slice(), [11]);

        // Untracked input changes do not wake the effect...
        ambient.set(20);
        assert_eq!(observed.borrow().as_slice(), [11]);

        // ...but the next tracked wake-up sees the latest value.
        tracked.set(2);
        assert_eq!(observed.borrow().as_slice(), [11, 22]);
    });
}

/// Disposal severs every edge in both directions and runs each cleanup
/// exactly once, LIFO per owner.
#[test]
fn disposal_tears_down_the_whole_subtree() {
    let outside = Signal::new(0);
    let cleanups = Rc::new(RefCell::new(Vec::new()));

    let dispose = create_root(|dispose| {
        let first = Rc::clone(&cleanups);
        let second = Rc::clone(&cleanups);
        on_cleanup(move || first.borrow_mut().push("root first")).unwrap();
        on_cleanup(move || second.borrow_mut().push("root second")).unwrap();

        let input = outside.clone();
        let inner = Rc::clone(&cleanups);
        Effect::new(move || {
            input.get();
            let inner = Rc::clone(&inner);
            on_cleanup(move || inner.borrow_mut().push("effect")).unwrap();
        })
        .unwrap();

        dispose
    });

    assert_eq!(outside.subscriber_count(), 1);
    assert!(cleanups.borrow().is_empty());

    dispose.dispose();

    // The surviving signal no longer reaches anything in the subtree.
    assert_eq!(outside.subscriber_count(), 0);
    // Each cleanup ran exactly once; LIFO within the root.
    assert_eq!(
        cleanups.borrow().as_slice(),
        ["root second", "root first", "effect"]
    );

    // Second disposal and later writes are inert.
    dispose.dispose();
    outside.set(1);
    assert_eq!(cleanups.borrow().len(), 3);
}

/// An effect disposed before a pending write reaches it never runs again.
#[test]
fn disposed_effect_is_not_flushed() {
    let signal = Signal::new(0);
    let runs = Rc::new(Cell::new(0));

    let dispose = create_root(|dispose| {
        let input = signal.clone();
        let counter = Rc::clone(&runs);
        Effect::new(move || {
            counter.set(counter.get() + 1);
            input.get();
        })
        .unwrap();
        dispose
    });
    assert_eq!(runs.get(), 1);

    batch(|| {
        signal.set(1);
        // The write queued the effect, but the subtree goes away before the
        // batch closes.
        dispose.dispose();
    });

    assert_eq!(runs.get(), 1);
}

/// Effects that write signals feed the flush worklist until a fixpoint.
#[test]
fn effect_writes_cascade_to_a_fixpoint() {
    create_root(|_| {
        let celsius = Signal::new(0);
        let fahrenheit = Signal::new(32);
        let (c_in, f_out) = (celsius.clone(), fahrenheit.clone());

        Effect::new(move || {
            f_out.set(c_in.get() * 9 / 5 + 32);
        })
        .unwrap();

        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        let f_in = fahrenheit.clone();
        Effect::new(move || {
            sink.borrow_mut().push(f_in.get());
        })
        .unwrap();
        assert_eq!(observed.borrow().as_slice(), [32]);

        celsius.set(100);
        assert_eq!(observed.borrow().as_slice(), [32, 212]);
    });
}

/// A memo chain stays unevaluated until something reads it.
#[test]
fn unread_memos_do_no_work() {
    create_root(|_| {
        let signal = Signal::new(1);
        let input = signal.clone();

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let expensive = Memo::new(move || {
            counter.set(counter.get() + 1);
            input.get() * 1000
        })
        .unwrap();

        signal.set(2);
        signal.set(3);
        assert_eq!(calls.get(), 0);

        assert_eq!(expensive.get(), 3000);
        assert_eq!(calls.get(), 1);
    });
}

/// Memos created during an effect run are owned by the effect and replaced
/// on re-run.
#[test]
fn effect_owned_memos_are_rebuilt_per_run() {
    create_root(|_| {
        let signal = Signal::new(2);
        let input = signal.clone();
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);

        Effect::new(move || {
            let base = input.get();
            let squared = Memo::new(move || base * base).unwrap();
            sink.borrow_mut().push(squared.get());
        })
        .unwrap();

        signal.set(3);
        assert_eq!(observed.borrow().as_slice(), [4, 9]);
    });
}

/// Constructors signal misuse instead of inventing an owner.
#[test]
fn creating_primitives_without_an_owner_fails() {
    assert_eq!(
        Memo::new(|| 0).unwrap_err(),
        ReactiveError::NoActiveOwner
    );
    assert_eq!(Effect::new(|| {}).unwrap_err(), ReactiveError::NoActiveOwner);
    assert_eq!(on_cleanup(|| {}).unwrap_err(), ReactiveError::NoActiveOwner);

    // Signals are ownerless leaves and are always allowed.
    let signal = Signal::new(5);
    assert_eq!(signal.get(), 5);
}

/// `create_root` returns whatever its closure returns.
#[test]
fn create_root_passes_through_the_result() {
    let value = create_root(|_| 42);
    assert_eq!(value, 42);
}
