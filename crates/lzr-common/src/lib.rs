//! Common types for the lzr resolution engine.
//!
//! This crate provides foundational types used across all lzr crates:
//! - Simple names (`Name`) interned in a process-wide `ShardedInterner`
//! - Source spans (`Span`)
//! - Diagnostics and the diagnostic message catalog

// String interning for simple names
pub mod interner;
pub use interner::{Atom, Name, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostics reported by member-scope resolution
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation};
