//! Insertion-ordered descriptor sets with identity semantics.
//!
//! Member computation unions descriptors from several sources (declared,
//! inherited, synthesized). The same descriptor can arrive twice; the first
//! occurrence keeps its position.

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// `Rc` wrapper that compares and hashes by address.
pub struct ByPtr<T>(pub Rc<T>);

impl<T> Clone for ByPtr<T> {
    fn clone(&self) -> Self {
        ByPtr(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for ByPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for ByPtr<T> {}

impl<T> Hash for ByPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

pub struct DescriptorSet<T> {
    items: IndexSet<ByPtr<T>, FxBuildHasher>,
}

impl<T> DescriptorSet<T> {
    pub fn new() -> Self {
        DescriptorSet {
            items: IndexSet::with_hasher(FxBuildHasher),
        }
    }

    /// Returns false when the descriptor was already present.
    pub fn insert(&mut self, descriptor: Rc<T>) -> bool {
        self.items.insert(ByPtr(descriptor))
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = Rc<T>>) {
        for descriptor in descriptors {
            self.insert(descriptor);
        }
    }

    pub fn contains(&self, descriptor: &Rc<T>) -> bool {
        self.items.contains(&ByPtr(Rc::clone(descriptor)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<T>> {
        self.items.iter().map(|item| &item.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Rc<T>> {
        self.iter().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<Rc<T>> {
        self.items.into_iter().map(|item| item.0).collect()
    }
}

impl<T> Default for DescriptorSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Rc<T>> for DescriptorSet<T> {
    fn from_iter<I: IntoIterator<Item = Rc<T>>>(iter: I) -> Self {
        let mut set = DescriptorSet::new();
        set.extend(iter);
        set
    }
}

impl<T: fmt::Debug> fmt::Debug for DescriptorSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
#[path = "tests/descriptor_set_tests.rs"]
mod tests;
