//! Lazily resolved class descriptors.
//!
//! A class descriptor is created as soon as its name is looked up, but
//! nothing about it is resolved until asked: supertypes, the companion
//! object, its member scope contents and its lexical scopes each live in
//! their own cell.

use crate::class_scope::ClassMemberScope;
use crate::context::ResolveContext;
use crate::declarations::{ClassDeclaration, ClassKind, ClassModifiers};
use crate::descriptors::{ClassifierDescriptor, ConstructorDescriptor, SourceElement, Visibility};
use crate::error::{ResolveError, internal_error};
use crate::lexical_scope::LexicalScope;
use crate::lookup::LookupLocation;
use crate::member_scope::LazyMemberScope;
use crate::package_scope::PackageMemberScope;
use crate::provider::ClassDeclarationProvider;
use crate::resolver::ResolvedSupertype;
use crate::scopes_support::ClassResolutionScopesSupport;
use crate::types::{FqName, Type};
use lzr_common::Name;
use lzr_common::diagnostics::diagnostic_codes;
use lzr_storage::LazyCell;
use rustc_hash::FxHashSet;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Non-owning link to whatever declares a class. Containers own their
/// classes through their memo tables, never the other way round.
#[derive(Clone)]
pub enum ClassContainer {
    Package(Weak<PackageMemberScope>),
    Class(Weak<LazyClassDescriptor>),
}

pub struct LazyClassDescriptor {
    ctx: Rc<ResolveContext>,
    this: Weak<LazyClassDescriptor>,
    declaration: Rc<ClassDeclaration>,
    fq_name: FqName,
    container: ClassContainer,
    is_synthetic: bool,
    provider: Rc<ClassDeclarationProvider>,
    member_scope: Rc<ClassMemberScope>,
    member_scope_view: LazyCell<Rc<ClassMemberScope>>,
    scopes: ClassResolutionScopesSupport,
    supertypes: LazyCell<Rc<[ResolvedSupertype]>>,
    companion: LazyCell<Option<Rc<LazyClassDescriptor>>>,
}

impl LazyClassDescriptor {
    pub(crate) fn new(
        ctx: Rc<ResolveContext>,
        container: ClassContainer,
        container_fq_name: &FqName,
        declaration: Rc<ClassDeclaration>,
        is_synthetic: bool,
    ) -> Rc<LazyClassDescriptor> {
        let fq_name = container_fq_name.child(declaration.name);
        trace!(target: "lzr::scope", class = %fq_name, is_synthetic, "class descriptor created");
        Rc::new_cyclic(|this: &Weak<LazyClassDescriptor>| {
            let provider = Rc::new(ClassDeclarationProvider::new(Rc::clone(&declaration)));
            LazyClassDescriptor {
                member_scope: ClassMemberScope::new(
                    Rc::clone(&ctx),
                    Rc::clone(&provider),
                    this.clone(),
                    fq_name.clone(),
                    None,
                ),
                member_scope_view: ctx.storage.lazy_cell(),
                scopes: ClassResolutionScopesSupport::new(this.clone(), &ctx.storage),
                supertypes: ctx.storage.lazy_cell(),
                companion: ctx.storage.lazy_cell(),
                this: this.clone(),
                ctx,
                declaration,
                fq_name,
                container,
                is_synthetic,
                provider,
            }
        })
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.declaration.name
    }

    pub fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    #[inline]
    pub fn kind(&self) -> ClassKind {
        self.declaration.kind
    }

    pub fn declaration(&self) -> &Rc<ClassDeclaration> {
        &self.declaration
    }

    pub fn context(&self) -> &Rc<ResolveContext> {
        &self.ctx
    }

    pub fn container(&self) -> &ClassContainer {
        &self.container
    }

    /// Enclosing class of a nested class.
    pub fn containing_class(&self) -> Option<Rc<LazyClassDescriptor>> {
        match &self.container {
            ClassContainer::Class(outer) => outer.upgrade(),
            ClassContainer::Package(_) => None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.declaration.visibility.unwrap_or(Visibility::Public)
    }

    pub fn source(&self) -> SourceElement {
        SourceElement {
            node: self.declaration.id,
            span: self.declaration.span,
        }
    }

    pub fn is_expect(&self) -> bool {
        self.declaration.modifiers.contains(ClassModifiers::EXPECT)
    }

    pub fn is_data(&self) -> bool {
        self.declaration.modifiers.contains(ClassModifiers::DATA)
    }

    pub fn is_value(&self) -> bool {
        self.declaration.modifiers.contains(ClassModifiers::VALUE)
    }

    pub fn is_inner(&self) -> bool {
        self.declaration.modifiers.contains(ClassModifiers::INNER)
    }

    pub fn is_companion_object(&self) -> bool {
        self.declaration.modifiers.contains(ClassModifiers::COMPANION)
    }

    /// Created by a plugin rather than declared in source.
    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }

    /// The class's member scope.
    pub fn member_scope(&self) -> Rc<ClassMemberScope> {
        Rc::clone(&self.member_scope)
    }

    /// Second member scope over the same class that reuses the first one's
    /// declared members, constructors and trace bindings.
    pub fn member_scope_view(&self) -> Rc<ClassMemberScope> {
        self.member_scope_view.get_or_compute(
            || {
                ClassMemberScope::new(
                    Rc::clone(&self.ctx),
                    Rc::clone(&self.provider),
                    self.this.clone(),
                    self.fq_name.clone(),
                    Some(Rc::clone(&self.member_scope)),
                )
            },
            |_| Rc::clone(&self.member_scope),
        )
    }

    pub fn scopes(&self) -> &ClassResolutionScopesSupport {
        &self.scopes
    }

    pub fn primary_constructor(&self) -> Option<Rc<ConstructorDescriptor>> {
        self.member_scope.primary_constructor()
    }

    pub fn constructors(&self) -> Vec<Rc<ConstructorDescriptor>> {
        self.member_scope.constructors()
    }

    /// Type of `this` inside the class.
    pub fn default_type(&self) -> Type {
        Type::class(&self.this_rc())
    }

    /// Resolved supertype list with inheritance cycles removed.
    pub fn supertype_entries(&self) -> Rc<[ResolvedSupertype]> {
        self.supertypes.get_or_compute(
            || self.compute_supertypes(),
            |first_time| {
                if first_time {
                    debug!(target: "lzr::scope", class = %self.fq_name, "supertypes requested while resolving them");
                }
                Rc::from(Vec::new())
            },
        )
    }

    /// False while the supertype list is still being resolved.
    pub fn are_supertypes_resolved(&self) -> bool {
        self.supertypes.is_computed()
    }

    pub fn supertypes(&self) -> Vec<Type> {
        self.supertype_entries().iter().map(|entry| entry.ty.clone()).collect()
    }

    /// Supertypes the class implements by delegation.
    pub fn delegated_supertypes(&self) -> Vec<Type> {
        self.supertype_entries()
            .iter()
            .filter(|entry| entry.by_delegation)
            .map(|entry| entry.ty.clone())
            .collect()
    }

    /// Direct superclass, unless it is `Any`. Interfaces and objects are not
    /// superclasses.
    pub fn superclass_not_any(&self) -> Option<Rc<LazyClassDescriptor>> {
        self.supertype_entries().iter().find_map(|entry| {
            entry
                .ty
                .class_descriptor()
                .filter(|class| matches!(class.kind(), ClassKind::Class | ClassKind::EnumClass))
        })
    }

    /// Superclass chain, nearest first, without `Any`. Stops at a repeated
    /// class or after the configured hierarchy depth.
    pub fn all_superclasses_without_any(&self) -> Vec<Rc<LazyClassDescriptor>> {
        let max_depth = self.ctx.options.max_hierarchy_depth as usize;
        let mut result: Vec<Rc<LazyClassDescriptor>> = Vec::new();
        let mut current = self.superclass_not_any();
        while let Some(class) = current {
            let seen = std::ptr::eq(Rc::as_ptr(&class), self) || result.iter().any(|known| Rc::ptr_eq(known, &class));
            if seen || result.len() >= max_depth {
                break;
            }
            current = class.superclass_not_any();
            result.push(class);
        }
        result
    }

    /// Declared companion object, or one requested by a plugin.
    pub fn companion_object(&self) -> Option<Rc<LazyClassDescriptor>> {
        self.companion.get_or_compute(|| self.compute_companion_object(), |_| None)
    }

    /// Lexical scope the class declaration itself is resolved in.
    pub(crate) fn outer_scope(&self) -> Rc<LexicalScope> {
        match &self.container {
            ClassContainer::Package(package) => match package.upgrade() {
                Some(package) => package.lexical_scope(),
                None => internal_error(ResolveError::ScopeInvalidated(format!(
                    "package of {} was dropped",
                    self.fq_name
                ))),
            },
            ClassContainer::Class(outer) => {
                let Some(outer) = outer.upgrade() else {
                    internal_error(ResolveError::ScopeInvalidated(format!(
                        "outer class of {} was dropped",
                        self.fq_name
                    )));
                };
                if self.is_inner() {
                    outer.scopes().member_declaration()
                } else if self.is_companion_object() {
                    outer.scopes().companion_object_header()
                } else {
                    outer.scopes().static_member_declaration()
                }
            }
        }
    }

    pub(crate) fn this_rc(&self) -> Rc<LazyClassDescriptor> {
        match self.this.upgrade() {
            Some(this) => this,
            None => internal_error(ResolveError::ScopeInvalidated(format!(
                "class {} was dropped",
                self.fq_name
            ))),
        }
    }

    fn compute_supertypes(&self) -> Rc<[ResolvedSupertype]> {
        let this = self.this_rc();
        let header = self.scopes.class_header();
        let resolved = self.ctx.resolver.resolve_supertypes(&this, &header, &self.ctx.trace);
        let mut kept = Vec::with_capacity(resolved.len());
        for entry in resolved {
            if let Some(class) = entry.ty.class_descriptor() {
                if self.is_reachable_from(&class) {
                    debug!(target: "lzr::scope", class = %self.fq_name, supertype = %entry.ty, "inheritance cycle broken");
                    self.ctx.trace.report_at(
                        self.declaration.span,
                        diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY,
                        &[self.fq_name.as_str()],
                    );
                    continue;
                }
            }
            kept.push(entry);
        }
        Rc::from(kept)
    }

    /// Whether walking supertypes from `start` leads back to this class.
    fn is_reachable_from(&self, start: &Rc<LazyClassDescriptor>) -> bool {
        let budget = self.ctx.options.max_hierarchy_depth as usize;
        let mut visited: FxHashSet<*const LazyClassDescriptor> = FxHashSet::default();
        let mut stack = vec![Rc::clone(start)];
        while let Some(class) = stack.pop() {
            if std::ptr::eq(Rc::as_ptr(&class), self) {
                return true;
            }
            if !visited.insert(Rc::as_ptr(&class)) || visited.len() > budget {
                continue;
            }
            stack.extend(class.supertype_entries().iter().filter_map(|entry| entry.ty.class_descriptor()));
        }
        false
    }

    fn compute_companion_object(&self) -> Option<Rc<LazyClassDescriptor>> {
        if let Some(declared) = self.declaration.companion_declaration() {
            let classifier = self
                .member_scope
                .contributed_classifier(declared.name, LookupLocation::ForAlreadyTracked);
            return match classifier {
                Some(ClassifierDescriptor::Class(class)) if class.is_companion_object() => Some(class),
                _ => None,
            };
        }
        let name = self.ctx.synthetic.synthetic_companion_object_name(self)?;
        let mut declaration = ClassDeclaration::companion();
        declaration.name = name;
        declaration.span = self.declaration.span;
        debug!(target: "lzr::scope", class = %self.fq_name, companion = %name, "synthetic companion object");
        Some(LazyClassDescriptor::new(
            Rc::clone(&self.ctx),
            ClassContainer::Class(self.this.clone()),
            &self.fq_name,
            Rc::new(declaration),
            true,
        ))
    }
}

impl fmt::Debug for LazyClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lazy class {}", self.fq_name)
    }
}

#[cfg(test)]
#[path = "tests/class_descriptor_tests.rs"]
mod tests;
