//! Member scope of a package: the top-level declarations of its files.

use crate::class_descriptor::{ClassContainer, LazyClassDescriptor};
use crate::context::ResolveContext;
use crate::declarations::{ClassDeclaration, SourceFile};
use crate::descriptor_set::DescriptorSet;
use crate::descriptors::{
    ClassifierDescriptor, DeclarationDescriptor, DescriptorOwner, FunctionDescriptor,
    PropertyDescriptor,
};
use crate::error::{ResolveError, internal_error};
use crate::kind_filter::{DescriptorKindFilter, NameFilter, filter_descriptors};
use crate::lexical_scope::LexicalScope;
use crate::lookup::{LookupLocation, ScopeKind, record_lookup};
use crate::member_scope::{LazyMemberScope, MemberScopeCore, NameSet};
use crate::provider::{DeclarationProvider, FileDeclarationProvider};
use crate::types::FqName;
use lzr_common::Name;
use lzr_storage::LazyCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub struct PackageMemberScope {
    core: MemberScopeCore,
    this: Weak<PackageMemberScope>,
    fq_name: FqName,
    lexical_scope: LazyCell<Rc<LexicalScope>>,
    declaration_names: LazyCell<NameSet>,
}

impl PackageMemberScope {
    pub fn new(ctx: Rc<ResolveContext>, provider: Rc<FileDeclarationProvider>) -> Rc<PackageMemberScope> {
        let fq_name = provider.package().clone();
        let provider: Rc<dyn DeclarationProvider> = provider;
        Rc::new_cyclic(|this| PackageMemberScope {
            lexical_scope: ctx.storage.lazy_cell(),
            declaration_names: ctx.storage.lazy_cell(),
            core: MemberScopeCore::new(ctx, provider, None),
            this: this.clone(),
            fq_name,
        })
    }

    /// Scope over the declarations of `files` that belong to `package`.
    pub fn from_files(ctx: Rc<ResolveContext>, package: &str, files: &[SourceFile]) -> Rc<PackageMemberScope> {
        let provider = FileDeclarationProvider::new(FqName::new(package), files);
        Self::new(ctx, Rc::new(provider))
    }

    pub fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    pub fn context(&self) -> &Rc<ResolveContext> {
        &self.core.ctx
    }

    /// Outermost lexical scope of every top-level declaration.
    pub fn lexical_scope(&self) -> Rc<LexicalScope> {
        self.lexical_scope.get_or_compute(
            || LexicalScope::package(&self.this_rc()),
            |_| LexicalScope::error(&self.fq_name),
        )
    }

    /// The top-level class `name`, if there is one.
    ///
    /// Classes link back to their package weakly. Keep the package alive
    /// while the class is in use; resolving anything of a class whose
    /// package is gone raises [`ResolveError::ScopeInvalidated`].
    pub fn class(&self, name: &str) -> Option<Rc<LazyClassDescriptor>> {
        match self.contributed_classifier(Name::identifier(name), LookupLocation::NoLocation)? {
            ClassifierDescriptor::Class(class) => Some(class),
            ClassifierDescriptor::TypeAlias(_) => None,
        }
    }

    fn this_rc(&self) -> Rc<PackageMemberScope> {
        match self.this.upgrade() {
            Some(this) => this,
            None => internal_error(ResolveError::ScopeInvalidated(format!(
                "package {} was dropped",
                self.fq_name
            ))),
        }
    }

    fn names(&self) -> NameSet {
        self.declaration_names.get_or_compute(
            || Rc::new(self.core.provider().declaration_names().into_iter().collect()),
            |_| NameSet::default(),
        )
    }
}

impl LazyMemberScope for PackageMemberScope {
    fn core(&self) -> &MemberScopeCore {
        &self.core
    }

    fn owner(&self) -> DescriptorOwner {
        DescriptorOwner::Package(self.fq_name.clone())
    }

    fn scope_for_member_declaration_resolution(&self) -> Rc<LexicalScope> {
        self.lexical_scope()
    }

    fn create_class_descriptor(&self, declaration: &Rc<ClassDeclaration>) -> Rc<LazyClassDescriptor> {
        LazyClassDescriptor::new(
            Rc::clone(&self.core.ctx),
            ClassContainer::Package(self.this.clone()),
            &self.fq_name,
            Rc::clone(declaration),
            false,
        )
    }

    fn non_declared_classes(&self, _name: Name, _result: &mut DescriptorSet<LazyClassDescriptor>) {}

    fn non_declared_functions(&self, _name: Name, _result: &mut DescriptorSet<FunctionDescriptor>) {}

    fn non_declared_properties(&self, _name: Name, _result: &mut DescriptorSet<PropertyDescriptor>) {}

    fn record_lookup(&self, name: Name, location: LookupLocation) {
        record_lookup(&*self.core.ctx.lookups, location, &self.fq_name, ScopeKind::Package, name);
    }

    fn contributed_descriptors(
        &self,
        kind_filter: DescriptorKindFilter,
        name_filter: &NameFilter<'_>,
    ) -> Vec<DeclarationDescriptor> {
        let descriptors =
            self.descriptors_from_declared_elements(kind_filter, name_filter, LookupLocation::WhenGetAllDescriptors);
        filter_descriptors(&descriptors, kind_filter, name_filter)
    }

    fn function_names(&self) -> NameSet {
        self.names()
    }

    fn variable_names(&self) -> NameSet {
        self.names()
    }

    fn classifier_names(&self) -> Option<NameSet> {
        Some(self.names())
    }

    fn definitely_does_not_contain_name(&self, name: Name) -> bool {
        !self.names().contains(&name)
    }
}

impl fmt::Debug for PackageMemberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lazy scope for package {}", self.fq_name)
    }
}
