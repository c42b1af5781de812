//! Name interning.
//!
//! Every simple name that flows through member scopes (class, function and
//! property names, synthesized `componentN` names) is interned into one
//! process-wide [`ShardedInterner`] and handled as a [`Name`], a `u32` handle.
//! Memo tables keyed by `Name` hash and compare integers instead of strings.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHasher};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tracing::error;

/// An interned string handle.
///
/// Atoms are cheap to copy and compare with `==` in O(1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel for the empty string.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

const SHARD_BITS: u32 = 6;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names every resolution session touches; interned up front.
const WELL_KNOWN_NAMES: &[&str] = &[
    "equals",
    "hashCode",
    "toString",
    "copy",
    "component1",
    "component2",
    "component3",
    "Companion",
    "Any",
    "Int",
    "String",
    "Boolean",
    "Unit",
    "<init>",
    "<no name provided>",
];

#[derive(Default)]
struct ShardState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

struct InternerShard {
    state: RwLock<ShardState>,
}

impl InternerShard {
    fn new() -> Self {
        InternerShard {
            state: RwLock::new(ShardState::default()),
        }
    }
}

/// Sharded string interner for concurrent use.
///
/// Independent resolution requests may run on separate threads, so the
/// interner uses fixed lock-striped buckets while keeping lookups O(1).
pub struct ShardedInterner {
    shards: [InternerShard; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create a new sharded interner with the empty string at index 0.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|_| InternerShard::new());

        if let Ok(mut state) = shards[0].state.write() {
            let empty: Arc<str> = Arc::from("");
            state.strings.push(empty.clone());
            state.map.insert(empty, Atom::NONE);
        }

        ShardedInterner { shards }
    }

    /// Intern a string, returning its Atom handle.
    #[inline]
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);
        let shard = &self.shards[shard_idx];
        if let Ok(state) = shard.state.read() {
            if let Some(&atom) = state.map.get(s) {
                return atom;
            }
        }

        let Ok(mut state) = shard.state.write() else {
            return Self::interning_failed(s, "shard lock poisoned");
        };
        // Another thread may have won the race between the two locks.
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Self::interning_failed(s, "shard is full");
        }

        let atom = Self::make_atom(local_index, shard_idx as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns the empty string for unknown atoms.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let (shard_idx, local_index) = Self::split_atom(atom);
        let shard = self.shards.get(shard_idx)?;
        let state = shard.state.read().ok()?;
        state.strings.get(local_index).cloned()
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .state
                    .read()
                    .map(|state| state.strings.len())
                    .unwrap_or(0)
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Every failed name collapses into the empty name, so make it loud.
    #[cold]
    fn interning_failed(s: &str, reason: &str) -> Atom {
        error!(target: "lzr::interner", name = s, reason, "name could not be interned");
        debug_assert!(false, "name {s:?} could not be interned: {reason}");
        Atom::NONE
    }

    fn intern_well_known(&self) {
        for s in WELL_KNOWN_NAMES {
            self.intern(s);
        }
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }

    #[inline]
    fn make_atom(local_index: u32, shard_idx: u32) -> Atom {
        Atom((local_index << SHARD_BITS) | (shard_idx & SHARD_MASK))
    }

    #[inline]
    fn split_atom(atom: Atom) -> (usize, usize) {
        let raw = atom.0;
        ((raw & SHARD_MASK) as usize, (raw >> SHARD_BITS) as usize)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

static NAMES: Lazy<ShardedInterner> = Lazy::new(|| {
    let interner = ShardedInterner::new();
    interner.intern_well_known();
    interner
});

// =============================================================================
// Name
// =============================================================================

/// A simple (unqualified) declaration name.
///
/// Special names are wrapped in angle brackets (`<init>`) and can never
/// collide with identifiers written in source.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(Atom);

impl Name {
    /// Name of an identifier as written in source.
    pub fn identifier(text: &str) -> Name {
        debug_assert!(
            !text.starts_with('<'),
            "identifier must not look like a special name: {text}"
        );
        Name(NAMES.intern(text))
    }

    /// Special compiler name, e.g. `<init>` or `<no name provided>`.
    pub fn special(text: &str) -> Name {
        debug_assert!(
            text.starts_with('<') && text.ends_with('>'),
            "special name must be wrapped in angle brackets: {text}"
        );
        Name(NAMES.intern(text))
    }

    /// Interned text of this name.
    pub fn as_str(self) -> Arc<str> {
        NAMES.resolve(self.0)
    }

    pub fn is_special(self) -> bool {
        self.as_str().starts_with('<')
    }

    #[inline]
    pub fn atom(self) -> Atom {
        self.0
    }

    /// Name for declarations without one (anonymous objects, broken syntax).
    pub fn no_name_provided() -> Name {
        Name::special("<no name provided>")
    }

    /// Name for constructors.
    pub fn init() -> Name {
        Name::special("<init>")
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

#[cfg(test)]
#[path = "tests/interner_tests.rs"]
mod tests;
