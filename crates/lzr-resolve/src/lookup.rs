//! Lookup tracking for incremental compilation.
//!
//! Every name lookup a member scope answers is reported to a
//! [`LookupTracker`] together with where it came from. An incremental build
//! uses the records to decide which files must be recompiled when a
//! declaration appears or disappears.

use crate::declarations::NodeId;
use crate::types::FqName;
use lzr_common::Name;
use std::cell::RefCell;
use tracing::trace;

/// Why a lookup happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupLocation {
    /// Programmatic lookup with no source position.
    NoLocation,
    /// Lookup made while resolving the given declaration node.
    FromDeclaration(NodeId),
    /// Part of enumerating every descriptor of a scope.
    WhenGetAllDescriptors,
    /// The caller already recorded this lookup; do not record again.
    ForAlreadyTracked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Package,
    Classifier,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupRecord {
    pub location: LookupLocation,
    pub scope: FqName,
    pub scope_kind: ScopeKind,
    pub name: Name,
}

pub trait LookupTracker {
    fn record(&self, location: LookupLocation, scope: &FqName, scope_kind: ScopeKind, name: Name);
}

/// Tracker for non-incremental sessions.
#[derive(Debug, Default)]
pub struct NoopLookupTracker;

impl LookupTracker for NoopLookupTracker {
    fn record(&self, _: LookupLocation, _: &FqName, _: ScopeKind, _: Name) {}
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct RecordingLookupTracker {
    records: RefCell<Vec<LookupRecord>>,
}

impl RecordingLookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LookupRecord> {
        self.records.borrow().clone()
    }

    pub fn take(&self) -> Vec<LookupRecord> {
        std::mem::take(&mut *self.records.borrow_mut())
    }

    /// Records for `name` in the scope named `scope`.
    pub fn lookups_of(&self, scope: &str, name: &str) -> Vec<LookupRecord> {
        let name = Name::identifier(name);
        self.records
            .borrow()
            .iter()
            .filter(|record| record.name == name && record.scope.as_str() == scope)
            .cloned()
            .collect()
    }
}

impl LookupTracker for RecordingLookupTracker {
    fn record(&self, location: LookupLocation, scope: &FqName, scope_kind: ScopeKind, name: Name) {
        self.records.borrow_mut().push(LookupRecord {
            location,
            scope: scope.clone(),
            scope_kind,
            name,
        });
    }
}

/// Forward a lookup to `tracker` unless it was already tracked.
pub fn record_lookup(
    tracker: &dyn LookupTracker,
    location: LookupLocation,
    scope: &FqName,
    scope_kind: ScopeKind,
    name: Name,
) {
    if location == LookupLocation::ForAlreadyTracked {
        return;
    }
    trace!(target: "lzr::lookup", scope = %scope, %name, ?location, "lookup");
    tracker.record(location, scope, scope_kind, name);
}
