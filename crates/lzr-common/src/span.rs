//! Byte-offset source spans attached to declaration nodes.

use serde::Serialize;

/// A half-open byte range `[start, start + length)` inside one file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub length: u32,
}

impl Span {
    /// Span used for synthesized declarations that have no source text.
    pub const SYNTHETIC: Span = Span {
        start: 0,
        length: 0,
    };

    #[inline]
    #[must_use]
    pub const fn new(start: u32, length: u32) -> Self {
        Span { start, length }
    }

    #[inline]
    pub const fn end(self) -> u32 {
        self.start + self.length
    }

    #[inline]
    pub const fn is_synthetic(self) -> bool {
        self.start == 0 && self.length == 0
    }
}
