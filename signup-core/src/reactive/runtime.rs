//! Reactive Runtime
//!
//! The runtime connects sources (signals, memos) to the memos that read them.
//!
//! # How It Works
//!
//! 1. A memo registers itself when it is created.
//!
//! 2. While a memo computes, every source it reads records an edge
//!    `source -> memo` here.
//!
//! 3. When a source changes, the runtime invalidates every memo on its
//!    edges. An invalidated memo in turn reports itself as a changed source,
//!    so invalidation reaches memos that read other memos.
//!
//! 4. Memos are lazy: nothing recomputes until the next read.
//!
//! The registry only holds weak references. Dropping the last handle to a
//! memo removes it.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, Weak};

use dashmap::DashMap;

use super::subscriber::{SourceId, SubscriberId};

/// A computation the runtime can invalidate.
pub trait Reactive: Send + Sync {
    /// Get the subscriber ID for this computation.
    fn subscriber_id(&self) -> SubscriberId;

    /// Drop cached state after one of the sources changed.
    fn invalidate(&self);
}

/// The global reactive runtime.
pub struct Runtime;

static REGISTRY: LazyLock<DashMap<SubscriberId, Weak<dyn Reactive>>> = LazyLock::new(DashMap::new);
static SUBSCRIPTIONS: LazyLock<DashMap<SourceId, HashSet<SubscriberId>>> = LazyLock::new(DashMap::new);

impl Runtime {
    /// Register a computation so it can be invalidated.
    pub fn register(subscriber_id: SubscriberId, reactive: Weak<dyn Reactive>) {
        REGISTRY.insert(subscriber_id, reactive);
    }

    /// Forget a computation and every edge that points at it.
    pub fn unregister(subscriber_id: SubscriberId) {
        REGISTRY.remove(&subscriber_id);
        Self::clear_dependencies(subscriber_id);
    }

    /// Remove every edge that starts at `source`.
    pub fn forget_source(source: SourceId) {
        SUBSCRIPTIONS.remove(&source);
    }

    /// Record that `subscriber` read `source`.
    pub fn add_dependency(source: SourceId, subscriber: SubscriberId) {
        SUBSCRIPTIONS.entry(source).or_default().insert(subscriber);
    }

    /// Remove all edges that point at `subscriber`.
    ///
    /// Called before a memo recomputes so stale reads do not linger.
    pub fn clear_dependencies(subscriber: SubscriberId) {
        for mut entry in SUBSCRIPTIONS.iter_mut() {
            entry.value_mut().remove(&subscriber);
        }
    }

    /// Invalidate everything that read `source`.
    pub fn notify_source_change(source: SourceId) {
        let subscriber_ids: Vec<SubscriberId> = match SUBSCRIPTIONS.get(&source) {
            Some(subs) => subs.iter().copied().collect(),
            None => return,
        };

        // Upgrade first, invalidate after: invalidation re-enters the maps.
        let targets: Vec<Arc<dyn Reactive>> = subscriber_ids
            .iter()
            .filter_map(|id| REGISTRY.get(id).and_then(|weak| weak.upgrade()))
            .collect();

        for target in targets {
            target.invalidate();
        }
    }

    /// Number of computations that read `source` during their last run.
    pub fn subscriber_count(source: SourceId) -> usize {
        SUBSCRIPTIONS.get(&source).map(|subs| subs.len()).unwrap_or(0)
    }

    /// Check whether a computation is currently registered.
    pub fn is_registered(subscriber_id: SubscriberId) -> bool {
        REGISTRY.contains_key(&subscriber_id)
    }
}
