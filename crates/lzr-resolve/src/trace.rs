//! Per-compilation-unit diagnostic sink and binding slices.
//!
//! Resolution reports every user-facing problem here instead of failing.
//! Besides diagnostics the trace keeps the one binding other components read
//! back: which property a primary-constructor parameter declares.

use crate::declarations::NodeId;
use crate::descriptors::{MemberOrigin, PropertyDescriptor, SourceElement};
use crate::types::FqName;
use indexmap::IndexMap;
use lzr_common::diagnostics::diagnostic_codes;
use lzr_common::{Diagnostic, Span};
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Rank of a platform clash diagnostic; the higher one is kept.
///
/// Any clash involving an interface default-implementation body loses to
/// every other clash. Otherwise a multifile-class part outranks an ordinary
/// member, which outranks a multifile-class facade.
pub fn clash_priority(origins: &[MemberOrigin]) -> u8 {
    if origins.contains(&MemberOrigin::DefaultImpl) {
        return 0;
    }
    origins
        .iter()
        .map(|origin| match origin {
            MemberOrigin::DefaultImpl => 0,
            MemberOrigin::MultifileClass => 1,
            MemberOrigin::Other => 2,
            MemberOrigin::MultifileClassPart => 3,
        })
        .max()
        .unwrap_or(2)
}

struct JvmClash {
    priority: u8,
    diagnostic: Diagnostic,
}

pub struct DiagnosticTrace {
    file: String,
    diagnostics: RefCell<Vec<Diagnostic>>,
    jvm_clashes: RefCell<IndexMap<(FqName, String), JvmClash, FxBuildHasher>>,
    parameter_properties: RefCell<FxHashMap<NodeId, Rc<PropertyDescriptor>>>,
}

impl DiagnosticTrace {
    pub fn new(file: impl Into<String>) -> Self {
        DiagnosticTrace {
            file: file.into(),
            diagnostics: RefCell::new(Vec::new()),
            jvm_clashes: RefCell::new(IndexMap::with_hasher(FxBuildHasher)),
            parameter_properties: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        debug!(
            target: "lzr::scope",
            code = diagnostic.code,
            message = %diagnostic.message_text,
            "diagnostic reported"
        );
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Report catalog entry `code` at `span`.
    pub fn report_at(&self, span: Span, code: u32, args: &[&str]) {
        self.report(Diagnostic::from_code(
            self.file.clone(),
            span.start,
            span.length,
            code,
            args,
        ));
    }

    /// Report on a member's source, or on `fallback` for members without one.
    pub fn report_on(&self, source: Option<SourceElement>, fallback: Span, code: u32, args: &[&str]) {
        let span = source.map_or(fallback, |source| source.span);
        self.report_at(span, code, args);
    }

    /// Like [`report_on`](Self::report_on), pointing at each `related`
    /// member that has a source.
    pub fn report_on_related(
        &self,
        source: Option<SourceElement>,
        fallback: Span,
        code: u32,
        args: &[&str],
        related: &[(Option<SourceElement>, String)],
    ) {
        let span = source.map_or(fallback, |source| source.span);
        let mut diagnostic = Diagnostic::from_code(self.file.clone(), span.start, span.length, code, args);
        for (source, message) in related.iter().filter_map(|(source, message)| Some((source.as_ref()?, message))) {
            diagnostic = diagnostic.with_related(
                self.file.clone(),
                source.span.start,
                source.span.length,
                message.clone(),
            );
        }
        self.report(diagnostic);
    }

    /// Record a platform declaration clash for `signature` in `class`.
    ///
    /// At most one clash diagnostic is kept per (class, signature). A later
    /// report replaces the kept one only if its [`clash_priority`] is
    /// strictly higher.
    pub fn report_jvm_clash(
        &self,
        class: &FqName,
        signature: &str,
        origins: &[MemberOrigin],
        span: Span,
        members: &[String],
    ) {
        let priority = clash_priority(origins);
        let key = (class.clone(), signature.to_string());
        let mut clashes = self.jvm_clashes.borrow_mut();
        if let Some(existing) = clashes.get(&key) {
            if existing.priority >= priority {
                return;
            }
        }
        let members = members.join(", ");
        let diagnostic = Diagnostic::from_code(
            self.file.clone(),
            span.start,
            span.length,
            diagnostic_codes::CONFLICTING_JVM_DECLARATIONS,
            &[signature, &members],
        );
        debug!(target: "lzr::override", class = %class, signature, priority, "platform clash");
        clashes.insert(key, JvmClash {
            priority,
            diagnostic,
        });
    }

    /// Diagnostics reported so far, clashes last.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.borrow().clone();
        all.extend(self.jvm_clashes.borrow().values().map(|clash| clash.diagnostic.clone()));
        all
    }

    /// Drain every diagnostic reported so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = std::mem::take(&mut *self.diagnostics.borrow_mut());
        all.extend(
            self.jvm_clashes
                .borrow_mut()
                .drain(..)
                .map(|(_, clash)| clash.diagnostic),
        );
        all
    }

    pub fn count_of(&self, code: u32) -> usize {
        self.diagnostics().iter().filter(|d| d.code == code).count()
    }

    pub fn record_parameter_property(&self, parameter: NodeId, property: Rc<PropertyDescriptor>) {
        self.parameter_properties
            .borrow_mut()
            .insert(parameter, property);
    }

    /// Property declared by a `val`/`var` constructor parameter, once resolved.
    pub fn parameter_property(&self, parameter: NodeId) -> Option<Rc<PropertyDescriptor>> {
        self.parameter_properties.borrow().get(&parameter).cloned()
    }
}

impl std::fmt::Debug for DiagnosticTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticTrace")
            .field("file", &self.file)
            .field("diagnostics", &self.diagnostics.borrow().len())
            .field("jvm_clashes", &self.jvm_clashes.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/trace_tests.rs"]
mod tests;
