//! Memo Implementation
//!
//! A Memo is a cached derived value that re-evaluates only when one of the
//! sources it read has changed.
//!
//! # How Memos Work
//!
//! 1. Creation does not compute anything. The first `get` runs the
//!    computation inside a tracking context and caches the result.
//!
//! 2. Every signal or memo read during the computation records an edge in
//!    the runtime.
//!
//! 3. When one of those sources changes, the runtime marks the memo
//!    `MaybeDirty` and passes the invalidation on to memos that read this one.
//!
//! 4. The next `get` recomputes, refreshes the edges and marks the memo clean.
//!
//! The form controller keeps one memo per field for its validation errors
//! and one for overall validity, so a field update only re-validates what is
//! actually read afterwards.

use std::fmt::Debug;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::{Reactive, Runtime};
use super::subscriber::{SourceId, SubscriberId};

/// Dirty state for a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value is up-to-date.
    Clean,

    /// A source changed since the last computation.
    MaybeDirty,

    /// The memo has never computed, or was explicitly invalidated.
    Dirty,
}

struct MemoInner<T> {
    source_id: SourceId,
    subscriber_id: SubscriberId,
    compute: Box<dyn Fn() -> T + Send + Sync>,
    value: RwLock<Option<T>>,
    state: RwLock<MemoState>,
}

impl<T> Reactive for MemoInner<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn invalidate(&self) {
        let was_clean = {
            let mut state = self.state.write();
            let was_clean = *state == MemoState::Clean;
            if was_clean {
                *state = MemoState::MaybeDirty;
            }
            was_clean
        };

        // Readers of a memo that was already stale were invalidated with it.
        if was_clean {
            Runtime::notify_source_change(self.source_id);
        }
    }
}

impl<T> Drop for MemoInner<T> {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
        Runtime::forget_source(self.source_id);
    }
}

/// A cached derived value that recomputes only when its sources change.
///
/// The `PartialEq` bound lets [`Memo::refresh`] report whether a
/// recomputation produced a different value.
pub struct Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    inner: Arc<MemoInner<T>>,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a new memo with the given computation function.
    ///
    /// The computation is not run immediately. It runs on first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let inner = Arc::new(MemoInner {
            source_id: SourceId::new(),
            subscriber_id: SubscriberId::new(),
            compute: Box::new(compute),
            value: RwLock::new(None),
            state: RwLock::new(MemoState::Dirty),
        });

        let weak: Weak<dyn Reactive> = Arc::downgrade(&inner) as Weak<dyn Reactive>;
        Runtime::register(inner.subscriber_id, weak);

        Self { inner }
    }

    /// The ID other computations use to depend on this memo.
    pub fn id(&self) -> SourceId {
        self.inner.source_id
    }

    /// Get the subscriber ID for this memo.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        if let Some(current) = ReactiveContext::current_subscriber() {
            ReactiveContext::track_source(self.inner.source_id);
            Runtime::add_dependency(self.inner.source_id, current);
        }

        if self.state() == MemoState::Clean {
            if let Some(value) = self.inner.value.read().as_ref() {
                return value.clone();
            }
        }

        self.recompute().0
    }

    /// Bring the memo up to date and report whether its value changed.
    ///
    /// A memo that has never computed reports `true`.
    pub fn refresh(&self) -> bool {
        if self.state() == MemoState::Clean && self.has_value() {
            return false;
        }
        self.recompute().1
    }

    /// Mark the memo as potentially needing recomputation.
    pub fn mark_maybe_dirty(&self) {
        self.inner.invalidate();
    }

    /// Mark the memo as definitely needing recomputation.
    pub fn mark_dirty(&self) {
        *self.inner.state.write() = MemoState::Dirty;
        Runtime::notify_source_change(self.inner.source_id);
    }

    /// Run the computation inside a tracking context.
    fn recompute(&self) -> (T, bool) {
        Runtime::clear_dependencies(self.inner.subscriber_id);

        let new_value = {
            let _ctx = ReactiveContext::enter(self.inner.subscriber_id);
            (self.inner.compute)()
        };

        let changed = {
            let mut cached = self.inner.value.write();
            let changed = cached.as_ref() != Some(&new_value);
            *cached = Some(new_value.clone());
            changed
        };

        *self.inner.state.write() = MemoState::Clean;

        (new_value, changed)
    }

    /// Get the current dirty state.
    pub fn state(&self) -> MemoState {
        *self.inner.state.read()
    }

    /// Check if the memo has a cached value.
    pub fn has_value(&self) -> bool {
        self.inner.value.read().is_some()
    }

    /// Number of memos that read this memo during their last computation.
    pub fn dependent_count(&self) -> usize {
        Runtime::subscriber_count(self.inner.source_id)
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.source_id)
            .field("state", &self.state())
            .field("has_value", &self.has_value())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn memo_computes_on_first_access() {
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let memo = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert!(!memo.has_value());
        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        assert_eq!(memo.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(memo.has_value());
    }

    #[test]
    fn memo_caches_value_when_clean() {
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        let memo = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert_eq!(memo.get(), 42);
        assert_eq!(memo.get(), 42);
        assert_eq!(memo.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn memo_recomputes_when_signal_changes() {
        let signal = Signal::new(10);
        let call_count = Arc::new(AtomicI32::new(0));

        let signal_clone = signal.clone();
        let call_count_clone = call_count.clone();
        let doubled = Memo::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            signal_clone.get() * 2
        });

        assert_eq!(doubled.get(), 20);
        assert_eq!(doubled.state(), MemoState::Clean);

        signal.set(5);
        assert_eq!(doubled.state(), MemoState::MaybeDirty);
        assert_eq!(doubled.get(), 10);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidation_reaches_memo_of_memo() {
        let base = Signal::new(5);

        let base_clone = base.clone();
        let doubled = Memo::new(move || base_clone.get() * 2);

        let doubled_clone = doubled.clone();
        let plus_ten = Memo::new(move || doubled_clone.get() + 10);

        assert_eq!(plus_ten.get(), 20);
        assert_eq!(doubled.dependent_count(), 1);

        base.set(10);
        assert_eq!(plus_ten.state(), MemoState::MaybeDirty);
        assert_eq!(plus_ten.get(), 30);
    }

    #[test]
    fn refresh_reports_value_changes() {
        let signal = Signal::new(3);
        let signal_clone = signal.clone();
        let is_even = Memo::new(move || signal_clone.get() % 2 == 0);

        assert!(is_even.refresh());
        assert!(!is_even.refresh());

        signal.set(5);
        assert!(!is_even.refresh());

        signal.set(4);
        assert!(is_even.refresh());
        assert!(is_even.get());
    }

    #[test]
    fn memo_state_transitions() {
        let memo = Memo::new(|| 42);

        assert_eq!(memo.state(), MemoState::Dirty);

        memo.get();
        assert_eq!(memo.state(), MemoState::Clean);

        memo.mark_maybe_dirty();
        assert_eq!(memo.state(), MemoState::MaybeDirty);

        memo.mark_dirty();
        assert_eq!(memo.state(), MemoState::Dirty);

        memo.get();
        assert_eq!(memo.state(), MemoState::Clean);
    }

    #[test]
    fn dropping_memo_unregisters_it() {
        let memo = Memo::new(|| 1);
        let subscriber = memo.subscriber_id();
        assert!(Runtime::is_registered(subscriber));

        let clone = memo.clone();
        drop(memo);
        assert!(Runtime::is_registered(subscriber));

        drop(clone);
        assert!(!Runtime::is_registered(subscriber));
    }
}
