//! Storage primitives for lazy resolution.
//!
//! Everything the resolution engine caches lives in one of these:
//! - [`LazyCell`]: a single deferred slot with a recursion fallback
//! - [`LazyValue`]: a `LazyCell` bundled with its computation
//! - [`MemoTable`]: one `LazyCell` per key, created on demand
//! - [`StorageManager`]: factory, statistics and cancellation for a session
//!
//! The model is single-threaded and cooperative. There are no locks: a cell
//! re-entered while computing answers with its fallback instead of blocking.

pub mod lazy;
pub mod manager;
pub mod memo;

pub use lazy::{LazyCell, LazyValue, SlotState};
pub use manager::{CancellationToken, Canceled, StorageManager, StorageStats};
pub use memo::MemoTable;
