//! lzr: lazy member-scope resolution.
//!
//! Facade over the workspace crates. Most users want [`PackageMemberScope`]
//! to get at classes, and [`LazyMemberScope`] to query them.

// Names, spans and the diagnostic catalog
pub use lzr_common as common;
pub use lzr_common::{Diagnostic, Name, Span};

// Lazy cells, memo tables and cancellation
pub use lzr_storage as storage;
pub use lzr_storage::{CancellationToken, StorageManager};

// Declarations, descriptors and scopes
pub use lzr_resolve as resolve;
pub use lzr_resolve::{
    ClassDeclaration, ClassMemberScope, DeclarationDescriptor, DescriptorKindFilter,
    LazyClassDescriptor, LazyMemberScope, LookupLocation, NameFilter, PackageMemberScope,
    ResolveContext, ResolveError, ResolverOptions, SourceFile, force_resolve_package, run_guarded,
};

// Tracing configuration (LZR_LOG, LZR_LOG_FORMAT)
pub mod tracing_config;
pub use tracing_config::{LogFormat, init_tracing};

use std::rc::Rc;

/// Everything one compilation unit produced: its package scope and the
/// diagnostics reported while resolving all of it.
pub struct CompilationUnit {
    pub package: Rc<PackageMemberScope>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: lzr_resolve::ForceResolveStats,
}

/// Resolve every declaration of `package` in `files` eagerly.
///
/// Internal errors and cancellation abort the unit; user errors land in
/// `diagnostics`.
pub fn compile_package(
    ctx: ResolveContext,
    package: &str,
    files: &[SourceFile],
) -> Result<CompilationUnit, ResolveError> {
    let token = ctx.storage.cancellation().clone();
    tracing::debug!(target: "lzr::unit", package, files = files.len(), "compiling package");
    let scope = PackageMemberScope::from_files(Rc::new(ctx), package, files);
    let stats = run_guarded(|| force_resolve_package(&scope, &token))??;
    let diagnostics = scope.context().trace.take_diagnostics();
    tracing::debug!(
        target: "lzr::unit",
        package,
        classes = stats.classes,
        diagnostics = diagnostics.len(),
        "package resolved"
    );
    Ok(CompilationUnit {
        package: scope,
        diagnostics,
        stats,
    })
}
