//! Factory for lazy cells and memo tables.
//!
//! A [`StorageManager`] is shared by every scope of one resolution session.
//! It labels the session in trace output, counts computations and recursion
//! hits for the cells it creates, and carries the session's cooperative
//! [`CancellationToken`].

use crate::lazy::{LazyCell, LazyValue};
use crate::memo::MemoTable;
use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace_span};

/// Counters shared by the cells of one manager.
#[derive(Debug, Default)]
pub struct StorageStats {
    computations: Cell<u64>,
    recursion_hits: Cell<u64>,
}

impl StorageStats {
    pub(crate) fn record_computation(&self) {
        self.computations.set(self.computations.get().saturating_add(1));
    }

    pub(crate) fn record_recursion(&self) {
        self.recursion_hits.set(self.recursion_hits.get().saturating_add(1));
    }

    /// Number of computations started (including ones that later failed).
    pub fn computations(&self) -> u64 {
        self.computations.get()
    }

    /// Number of re-entrant reads answered by a recursion fallback.
    pub fn recursion_hits(&self) -> u64 {
        self.recursion_hits.get()
    }
}

/// Cooperative cancellation flag.
///
/// Cloned handles share the flag, so another thread can cancel a running
/// session. It is only polled between top-level lookups, never inside a cell
/// computation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    canceled: Arc<AtomicBool>,
}

/// Returned by [`CancellationToken::check`] once the token is canceled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canceled;

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    pub fn check(&self) -> Result<(), Canceled> {
        if self.is_canceled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }
}

pub struct StorageManager {
    label: String,
    stats: Rc<StorageStats>,
    cancellation: CancellationToken,
}

impl StorageManager {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_cancellation(label, CancellationToken::new())
    }

    #[must_use]
    pub fn with_cancellation(label: impl Into<String>, cancellation: CancellationToken) -> Self {
        let label = label.into();
        debug!(target: "lzr::storage", label = %label, "storage manager created");
        StorageManager {
            label,
            stats: Rc::new(StorageStats::default()),
            cancellation,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stats(&self) -> &StorageStats {
        &self.stats
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn lazy_cell<T>(&self) -> LazyCell<T> {
        LazyCell::with_stats(Some(Rc::clone(&self.stats)))
    }

    pub fn memo_table<K, V>(&self, label: &'static str) -> MemoTable<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        MemoTable::with_stats(label, Some(Rc::clone(&self.stats)))
    }

    /// A lazy value whose re-entrant reads see a clone of `fallback`.
    pub fn recursion_tolerant_lazy_value<T: Clone + 'static>(
        &self,
        compute: impl Fn() -> T + 'static,
        fallback: T,
    ) -> LazyValue<T> {
        LazyValue::recursion_tolerant(compute, fallback).with_stats(Rc::clone(&self.stats))
    }

    /// Run uncached work on behalf of this session.
    pub fn compute<R>(&self, f: impl FnOnce() -> R) -> R {
        let _span = trace_span!(target: "lzr::storage", "compute", manager = %self.label).entered();
        f()
    }
}

impl std::fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageManager")
            .field("label", &self.label)
            .field("computations", &self.stats.computations())
            .field("recursion_hits", &self.stats.recursion_hits())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/manager_tests.rs"]
mod tests;
