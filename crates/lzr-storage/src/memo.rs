//! Keyed memoization on top of [`LazyCell`].
//!
//! A [`MemoTable`] owns one cell per distinct key, created on first use and
//! never evicted. Recursion is tracked per key: re-entering key `A` while it
//! is computing yields the recursion fallback for `A` and has no effect on any
//! other key.

use crate::lazy::LazyCell;
use crate::manager::StorageStats;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

pub struct MemoTable<K, V> {
    label: &'static str,
    cells: RefCell<FxHashMap<K, Rc<LazyCell<V>>>>,
    stats: Option<Rc<StorageStats>>,
}

impl<K, V> MemoTable<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self::with_stats(label, None)
    }

    pub(crate) fn with_stats(label: &'static str, stats: Option<Rc<StorageStats>>) -> Self {
        MemoTable {
            label,
            cells: RefCell::new(FxHashMap::default()),
            stats,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn cell(&self, key: &K) -> Rc<LazyCell<V>> {
        // The map borrow must end before computing: the computation may
        // insert other keys into this same table.
        let mut cells = self.cells.borrow_mut();
        if let Some(cell) = cells.get(key) {
            return Rc::clone(cell);
        }
        let cell = Rc::new(LazyCell::with_stats(self.stats.clone()));
        cells.insert(key.clone(), Rc::clone(&cell));
        cell
    }

    /// Return the memoized value for `key`, computing it on first use.
    pub fn invoke(
        &self,
        key: &K,
        compute: impl FnOnce(&K) -> V,
        on_recursion: impl FnOnce(&K, bool) -> V,
    ) -> V {
        let cell = self.cell(key);
        cell.get_or_compute(|| compute(key), |first_time| on_recursion(key, first_time))
    }

    /// Like [`invoke`](Self::invoke), treating re-entrance as yielding `V::default()`.
    pub fn invoke_or_default(&self, key: &K, compute: impl FnOnce(&K) -> V) -> V
    where
        V: Default,
    {
        self.invoke(key, compute, |_, _| V::default())
    }

    pub fn is_computed(&self, key: &K) -> bool {
        self.cells
            .borrow()
            .get(key)
            .is_some_and(|cell| cell.is_computed())
    }

    pub fn is_computing(&self, key: &K) -> bool {
        self.cells
            .borrow()
            .get(key)
            .is_some_and(|cell| cell.is_computing())
    }

    /// The cached value for `key`, without computing anything.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.cells.borrow().get(key).and_then(|cell| cell.peek())
    }

    /// Number of keys that have a cell (computed or not).
    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.borrow().is_empty()
    }

    /// Keys whose computation has finished.
    pub fn computed_keys(&self) -> Vec<K> {
        self.cells
            .borrow()
            .iter()
            .filter(|(_, cell)| cell.is_computed())
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<K, V> fmt::Debug for MemoTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoTable")
            .field("label", &self.label)
            .field("entries", &self.cells.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/memo_tests.rs"]
mod tests;
