//! Reactive Primitives
//!
//! The form state is held in signals and its validation results are derived
//! through memos.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. Reading it inside a memo
//! computation registers the memo as a dependent; writing it invalidates
//! those dependents.
//!
//! ## Memos
//!
//! A Memo is a derived value that caches its result and recomputes lazily
//! after one of its sources changed. Memos can read other memos.
//!
//! # Implementation Notes
//!
//! Dependency tracking is automatic: a thread-local context records which
//! computation is running, and the runtime keeps the source to memo edges.

mod context;
mod memo;
mod runtime;
mod signal;
mod subscriber;

pub use context::ReactiveContext;
pub use memo::{Memo, MemoState};
pub use runtime::{Reactive, Runtime};
pub use signal::Signal;
pub use subscriber::{SourceId, SubscriberId};
