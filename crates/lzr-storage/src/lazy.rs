//! Deferred, memoized computation cells with recursion fallback.
//!
//! A [`LazyCell`] computes its value at most once. Re-entering the cell while
//! its own computation is still running (directly or through any chain of
//! other cells) never recurses: the re-entrant caller receives the value of a
//! caller-supplied recursion callback instead.
//!
//! # States
//!
//! ```text
//! NotComputed --get--> Computing --done--> Computed
//!                          |
//!                          +--re-entered--> RecursionDetected --done--> Computed
//! ```
//!
//! The recursion callback receives `first_time == true` for the first
//! re-entrant call and `false` for every later one. The cell stays in
//! `RecursionDetected` until the outer computation publishes its result, which
//! then becomes permanent.
//!
//! If the computation panics (or a fallible computation returns `Err`), the
//! cell goes back to `NotComputed` and a later call computes again.

use crate::manager::StorageStats;
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a [`LazyCell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    NotComputed,
    Computing,
    RecursionDetected,
    Computed,
}

/// A single deferred slot.
pub struct LazyCell<T> {
    id: u64,
    state: Cell<SlotState>,
    value: OnceCell<T>,
    stats: Option<Rc<StorageStats>>,
}

/// Puts the cell back into `NotComputed` unless the computation finished.
struct ResetOnUnwind<'a> {
    state: &'a Cell<SlotState>,
    finished: bool,
}

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.set(SlotState::NotComputed);
        }
    }
}

impl<T> LazyCell<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_stats(None)
    }

    pub(crate) fn with_stats(stats: Option<Rc<StorageStats>>) -> Self {
        LazyCell {
            id: NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed),
            state: Cell::new(SlotState::NotComputed),
            value: OnceCell::new(),
            stats,
        }
    }

    /// Process-unique id used to correlate trace events.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn state(&self) -> SlotState {
        self.state.get()
    }

    #[inline]
    pub fn is_computed(&self) -> bool {
        self.value.get().is_some()
    }

    /// True while the first computation is on the stack.
    #[inline]
    pub fn is_computing(&self) -> bool {
        matches!(
            self.state.get(),
            SlotState::Computing | SlotState::RecursionDetected
        )
    }

    /// Borrow the value if it has already been computed.
    #[inline]
    pub fn get_ref(&self) -> Option<&T> {
        self.value.get()
    }

    fn enter<R>(&self, on_recursion: impl FnOnce(bool) -> R) -> Result<ResetOnUnwind<'_>, R> {
        match self.state.get() {
            SlotState::Computing => {
                self.state.set(SlotState::RecursionDetected);
                self.note_recursion(true);
                Err(on_recursion(true))
            }
            SlotState::RecursionDetected => {
                self.note_recursion(false);
                Err(on_recursion(false))
            }
            SlotState::NotComputed | SlotState::Computed => {
                self.state.set(SlotState::Computing);
                if let Some(stats) = &self.stats {
                    stats.record_computation();
                }
                Ok(ResetOnUnwind {
                    state: &self.state,
                    finished: false,
                })
            }
        }
    }

    fn note_recursion(&self, first_time: bool) {
        trace!(target: "lzr::storage", cell = self.id, first_time, "recursion detected");
        if let Some(stats) = &self.stats {
            stats.record_recursion();
        }
    }

    fn publish(&self, mut guard: ResetOnUnwind<'_>, value: T) -> &T {
        guard.finished = true;
        self.state.set(SlotState::Computed);
        // Only the frame that moved the cell into `Computing` gets here, so the
        // slot is still empty.
        self.value.get_or_init(|| value)
    }
}

impl<T: Clone> LazyCell<T> {
    /// Clone of the value if it has already been computed.
    #[inline]
    pub fn peek(&self) -> Option<T> {
        self.value.get().cloned()
    }

    /// Return the cached value, computing it on first use.
    ///
    /// `on_recursion` is only called when this cell is re-entered during its
    /// own computation; its result is handed to the re-entrant caller and is
    /// never cached.
    pub fn get_or_compute(
        &self,
        compute: impl FnOnce() -> T,
        on_recursion: impl FnOnce(bool) -> T,
    ) -> T {
        self.get_or_compute_with_post(compute, on_recursion, |_| {})
    }

    /// Like [`get_or_compute`](Self::get_or_compute), then runs `post_compute`
    /// once on the freshly published value. `post_compute` may read the cell.
    pub fn get_or_compute_with_post(
        &self,
        compute: impl FnOnce() -> T,
        on_recursion: impl FnOnce(bool) -> T,
        post_compute: impl FnOnce(&T),
    ) -> T {
        if let Some(value) = self.value.get() {
            return value.clone();
        }
        let guard = match self.enter(on_recursion) {
            Ok(guard) => guard,
            Err(fallback) => return fallback,
        };
        let value = compute();
        let stored = self.publish(guard, value);
        post_compute(stored);
        stored.clone()
    }

    /// Fallible variant. An `Err` is returned to the caller and leaves the
    /// cell uncomputed.
    pub fn try_get_or_compute<E>(
        &self,
        compute: impl FnOnce() -> Result<T, E>,
        on_recursion: impl FnOnce(bool) -> Result<T, E>,
    ) -> Result<T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let guard = match self.enter(on_recursion) {
            Ok(guard) => guard,
            Err(fallback) => return fallback,
        };
        let value = compute()?;
        Ok(self.publish(guard, value).clone())
    }
}

impl<T> Default for LazyCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LazyCell<T> {
    // Never prints the value: formatting must not force or walk lazy graphs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCell")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .finish()
    }
}

// =============================================================================
// LazyValue
// =============================================================================

type RecursionFallback<T> = Box<dyn Fn(bool) -> T>;

/// A [`LazyCell`] bundled with its computation.
///
/// Used where the computation can be captured up front, e.g. deferred types
/// that close over a weak reference to their owner.
pub struct LazyValue<T> {
    cell: LazyCell<T>,
    compute: Box<dyn Fn() -> T>,
    on_recursion: Option<RecursionFallback<T>>,
}

impl<T: Clone + 'static> LazyValue<T> {
    /// A lazy value that treats re-entrance as a bug and panics.
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        LazyValue {
            cell: LazyCell::new(),
            compute: Box::new(compute),
            on_recursion: None,
        }
    }

    /// A lazy value whose re-entrant reads see `on_recursion(first_time)`.
    pub fn with_fallback(
        compute: impl Fn() -> T + 'static,
        on_recursion: impl Fn(bool) -> T + 'static,
    ) -> Self {
        LazyValue {
            cell: LazyCell::new(),
            compute: Box::new(compute),
            on_recursion: Some(Box::new(on_recursion)),
        }
    }

    /// A lazy value whose re-entrant reads see a clone of `fallback`.
    pub fn recursion_tolerant(compute: impl Fn() -> T + 'static, fallback: T) -> Self {
        Self::with_fallback(compute, move |_| fallback.clone())
    }

    pub(crate) fn with_stats(mut self, stats: Rc<StorageStats>) -> Self {
        self.cell.stats = Some(stats);
        self
    }

    pub fn get(&self) -> T {
        self.cell.get_or_compute(
            || (self.compute)(),
            |first_time| match &self.on_recursion {
                Some(on_recursion) => on_recursion(first_time),
                None => panic!("Recursive call in a lazy value (cell {})", self.cell.id()),
            },
        )
    }

    #[inline]
    pub fn is_computed(&self) -> bool {
        self.cell.is_computed()
    }

    #[inline]
    pub fn is_computing(&self) -> bool {
        self.cell.is_computing()
    }
}

impl<T> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LazyValue").field(&self.cell).finish()
    }
}

#[cfg(test)]
#[path = "tests/lazy_tests.rs"]
mod tests;
