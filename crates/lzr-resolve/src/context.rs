//! Shared collaborators of one resolution session.

use crate::lookup::{LookupTracker, NoopLookupTracker};
use crate::options::ResolverOptions;
use crate::resolver::{DefaultDescriptorResolver, DescriptorResolver};
use crate::synthetic::{
    AdditionalClassPartsProvider, NoAdditionalClassParts, NoSyntheticMembers,
    SyntheticResolveExtension,
};
use crate::trace::DiagnosticTrace;
use lzr_storage::{CancellationToken, StorageManager};
use std::rc::Rc;

/// Everything scopes of one compilation unit share: storage, the trace,
/// and the injected collaborators.
pub struct ResolveContext {
    pub storage: StorageManager,
    pub trace: DiagnosticTrace,
    pub resolver: Rc<dyn DescriptorResolver>,
    pub synthetic: Rc<dyn SyntheticResolveExtension>,
    pub class_parts: Rc<dyn AdditionalClassPartsProvider>,
    pub lookups: Rc<dyn LookupTracker>,
    pub options: ResolverOptions,
}

impl ResolveContext {
    /// Context with default collaborators; `file` labels diagnostics.
    pub fn new(file: &str) -> Self {
        ResolveContext {
            storage: StorageManager::new(file),
            trace: DiagnosticTrace::new(file),
            resolver: Rc::new(DefaultDescriptorResolver),
            synthetic: Rc::new(NoSyntheticMembers),
            class_parts: Rc::new(NoAdditionalClassParts),
            lookups: Rc::new(NoopLookupTracker),
            options: ResolverOptions::default(),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Rc<dyn DescriptorResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_synthetic(mut self, synthetic: Rc<dyn SyntheticResolveExtension>) -> Self {
        self.synthetic = synthetic;
        self
    }

    #[must_use]
    pub fn with_class_parts(mut self, class_parts: Rc<dyn AdditionalClassPartsProvider>) -> Self {
        self.class_parts = class_parts;
        self
    }

    #[must_use]
    pub fn with_lookup_tracker(mut self, lookups: Rc<dyn LookupTracker>) -> Self {
        self.lookups = lookups;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.storage = StorageManager::with_cancellation(self.storage.label().to_string(), token);
        self
    }
}

impl std::fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("storage", &self.storage)
            .field("trace", &self.trace)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
