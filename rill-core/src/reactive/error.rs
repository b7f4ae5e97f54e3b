//! Error types for the reactive API.

use thiserror::Error;

/// Usage errors signaled synchronously at the call site.
///
/// Failures inside user callbacks are not represented here: a panic raised
/// by a memo or effect body, or by a cleanup callback, propagates unmodified
/// to the caller that triggered the transaction. The engine stays consistent
/// across the unwind (scopes restore, the transaction counter decrements),
/// but nodes still pending in later flush rounds are not reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// A memo, effect, or cleanup was created with no enclosing owner.
    /// The engine never creates a root implicitly; wrap the call in
    /// [`create_root`](crate::create_root).
    #[error("no reactive owner is active; wrap the call in `create_root`")]
    NoActiveOwner,
}
