//! Signal Implementation
//!
//! A Signal holds a mutable value and reports reads and writes to the
//! runtime.
//!
//! 1. When a signal is read inside a memo computation, the runtime records
//!    an edge from the signal to that memo.
//!
//! 2. When the value is replaced or updated in place, every memo on those
//!    edges is invalidated and recomputes on its next read.
//!
//! Clones share the same value.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::ReactiveContext;
use super::runtime::Runtime;
use super::subscriber::SourceId;

struct SignalInner<T> {
    id: SourceId,
    value: RwLock<T>,
}

impl<T> Drop for SignalInner<T> {
    fn drop(&mut self) {
        Runtime::forget_source(self.id);
    }
}

/// A reactive cell holding a value of type `T`.
///
/// ```rust
/// use signup_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// count.set(5);
/// count.update(|v| *v += 1);
/// assert_eq!(count.get(), 6);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<SignalInner<T>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: SourceId::new(),
                value: RwLock::new(value),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Get a clone of the current value, tracking the read.
    pub fn get(&self) -> T {
        self.track();
        self.inner.value.read().clone()
    }

    /// Get a clone of the current value without tracking the read.
    pub fn get_untracked(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Borrow the current value, tracking the read.
    ///
    /// The read lock is held while `f` runs, so `f` must not write to this
    /// signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&*self.inner.value.read())
    }

    /// Borrow the current value without tracking the read.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.read())
    }

    /// Replace the value and invalidate dependents.
    pub fn set(&self, value: T) {
        *self.inner.value.write() = value;
        Runtime::notify_source_change(self.inner.id);
    }

    /// Mutate the value in place and invalidate dependents.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut *self.inner.value.write());
        Runtime::notify_source_change(self.inner.id);
    }

    /// Number of memos that read this signal during their last computation.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.inner.id)
    }

    fn track(&self) {
        if let Some(subscriber_id) = ReactiveContext::current_subscriber() {
            ReactiveContext::track_source(self.inner.id);
            Runtime::add_dependency(self.inner.id, subscriber_id);
        }
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
