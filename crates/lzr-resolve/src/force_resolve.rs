//! Eager resolution of everything a class or package contains.
//!
//! Lazy scopes only report diagnostics for what is asked; forcing walks
//! every name so a compilation unit's diagnostics are complete. The walk
//! checks a cancellation token between names.

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptors::DeclarationDescriptor;
use crate::error::ResolveError;
use crate::kind_filter::{DescriptorKindFilter, NameFilter};
use crate::lookup::LookupLocation;
use crate::member_scope::LazyMemberScope;
use crate::package_scope::PackageMemberScope;
use lzr_storage::CancellationToken;
use std::rc::Rc;
use tracing::info;

/// What a forced walk touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForceResolveStats {
    pub classes: usize,
    pub functions: usize,
    pub properties: usize,
    pub constructors: usize,
}

/// Resolve every member of `class` and of its nested classes.
pub fn force_resolve_all_contents(
    class: &Rc<LazyClassDescriptor>,
    token: &CancellationToken,
) -> Result<ForceResolveStats, ResolveError> {
    let mut stats = ForceResolveStats::default();
    force_class(class, token, &mut stats)?;
    info!(target: "lzr::scope", class = %class.fq_name(), ?stats, "class contents resolved");
    Ok(stats)
}

/// Resolve every top-level declaration of `package` and everything inside.
pub fn force_resolve_package(
    package: &Rc<PackageMemberScope>,
    token: &CancellationToken,
) -> Result<ForceResolveStats, ResolveError> {
    let mut stats = ForceResolveStats::default();
    for descriptor in package.contributed_descriptors(DescriptorKindFilter::ALL, &NameFilter::All) {
        token.check()?;
        match descriptor {
            DeclarationDescriptor::Class(class) => force_class(&class, token, &mut stats)?,
            DeclarationDescriptor::Function(_) => stats.functions += 1,
            DeclarationDescriptor::Property(_) => stats.properties += 1,
            DeclarationDescriptor::TypeAlias(_) => {}
        }
    }
    info!(target: "lzr::scope", package = %package.fq_name(), ?stats, "package contents resolved");
    Ok(stats)
}

fn force_class(
    class: &Rc<LazyClassDescriptor>,
    token: &CancellationToken,
    stats: &mut ForceResolveStats,
) -> Result<(), ResolveError> {
    token.check()?;
    stats.classes += 1;
    class.supertype_entries();
    class.companion_object();
    let scope = class.member_scope();
    stats.constructors += scope.constructors().len();

    for &name in scope.function_names().iter() {
        token.check()?;
        stats.functions += scope.contributed_functions(name, LookupLocation::NoLocation).len();
    }
    for &name in scope.variable_names().iter() {
        token.check()?;
        stats.properties += scope.contributed_variables(name, LookupLocation::NoLocation).len();
    }

    token.check()?;
    for descriptor in scope.contributed_descriptors(DescriptorKindFilter::ALL, &NameFilter::All) {
        if let DeclarationDescriptor::Class(nested) = descriptor {
            force_class(&nested, token, stats)?;
        }
    }
    Ok(())
}
