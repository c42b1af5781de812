//! Shared machinery of lazy member scopes.
//!
//! A member scope answers name-keyed queries about one container (a package
//! or a class body). Every query is memoized per name; declared members are
//! resolved from the container's [`DeclarationProvider`] and the concrete
//! scope adds the members nobody declared (fake overrides, synthesized
//! members, plugin contributions) through the `non_declared_*` hooks.
//!
//! A scope built with a *main scope* is a second view of the same container:
//! it copies the main scope's declared members instead of resolving the
//! declarations again.

use crate::class_descriptor::LazyClassDescriptor;
use crate::context::ResolveContext;
use crate::declarations::{ClassDeclaration, DeclarationNode};
use crate::descriptor_set::DescriptorSet;
use crate::descriptors::{
    CallableMember, ClassifierDescriptor, DeclarationDescriptor, DescriptorOwner,
    FunctionDescriptor, PropertyDescriptor, TypeAliasDescriptor,
};
use crate::error::{ResolveError, internal_error};
use crate::kind_filter::{DescriptorKindFilter, NameFilter};
use crate::lexical_scope::LexicalScope;
use crate::lookup::LookupLocation;
use crate::provider::DeclarationProvider;
use indexmap::IndexSet;
use lzr_common::Name;
use lzr_storage::MemoTable;
use rustc_hash::FxBuildHasher;
use std::rc::Rc;

/// Deterministically ordered set of names.
pub type NameSet = Rc<IndexSet<Name, FxBuildHasher>>;

type PerName<T> = MemoTable<Name, Vec<Rc<T>>>;

/// State every lazy member scope carries.
pub struct MemberScopeCore {
    pub(crate) ctx: Rc<ResolveContext>,
    provider: Rc<dyn DeclarationProvider>,
    main_scope: Option<Rc<dyn LazyMemberScope>>,
    classes: PerName<LazyClassDescriptor>,
    type_aliases: PerName<TypeAliasDescriptor>,
    functions: PerName<FunctionDescriptor>,
    properties: PerName<PropertyDescriptor>,
    declared_functions: PerName<FunctionDescriptor>,
    declared_properties: PerName<PropertyDescriptor>,
}

impl MemberScopeCore {
    pub(crate) fn new(
        ctx: Rc<ResolveContext>,
        provider: Rc<dyn DeclarationProvider>,
        main_scope: Option<Rc<dyn LazyMemberScope>>,
    ) -> MemberScopeCore {
        let storage = &ctx.storage;
        MemberScopeCore {
            classes: storage.memo_table("classes"),
            type_aliases: storage.memo_table("type aliases"),
            functions: storage.memo_table("functions"),
            properties: storage.memo_table("properties"),
            declared_functions: storage.memo_table("declared functions"),
            declared_properties: storage.memo_table("declared properties"),
            ctx,
            provider,
            main_scope,
        }
    }

    pub fn context(&self) -> &Rc<ResolveContext> {
        &self.ctx
    }

    pub fn provider(&self) -> &Rc<dyn DeclarationProvider> {
        &self.provider
    }

    pub fn main_scope(&self) -> Option<&Rc<dyn LazyMemberScope>> {
        self.main_scope.as_ref()
    }

    /// Number of names whose functions have been resolved so far.
    pub fn resolved_function_names(&self) -> usize {
        self.functions.len()
    }
}

pub trait LazyMemberScope {
    fn core(&self) -> &MemberScopeCore;

    /// Owner stamped on every member this scope resolves.
    fn owner(&self) -> DescriptorOwner;

    /// Lexical scope member signatures are resolved in.
    fn scope_for_member_declaration_resolution(&self) -> Rc<LexicalScope>;

    fn create_class_descriptor(&self, declaration: &Rc<ClassDeclaration>) -> Rc<LazyClassDescriptor>;

    fn non_declared_classes(&self, name: Name, result: &mut DescriptorSet<LazyClassDescriptor>);

    fn non_declared_functions(&self, name: Name, result: &mut DescriptorSet<FunctionDescriptor>);

    fn non_declared_properties(&self, name: Name, result: &mut DescriptorSet<PropertyDescriptor>);

    fn record_lookup(&self, name: Name, location: LookupLocation);

    /// Everything the scope contains that passes both filters.
    fn contributed_descriptors(
        &self,
        kind_filter: DescriptorKindFilter,
        name_filter: &NameFilter<'_>,
    ) -> Vec<DeclarationDescriptor>;

    /// Superset of every function name in the scope.
    fn function_names(&self) -> NameSet;

    /// Superset of every property name in the scope.
    fn variable_names(&self) -> NameSet;

    /// Superset of every classifier name, or `None` when it cannot be known.
    fn classifier_names(&self) -> Option<NameSet>;

    /// `true` only when the scope provably has nothing named `name`.
    fn definitely_does_not_contain_name(&self, name: Name) -> bool;

    /// The classifier `name` denotes here.
    ///
    /// Non-expect classes win over non-expect type aliases, which win over
    /// expect classes, then expect aliases.
    fn contributed_classifier(&self, name: Name, location: LookupLocation) -> Option<ClassifierDescriptor> {
        self.record_lookup(name, location);
        let classes = classes_named(self, name);
        let aliases = type_aliases_named(self, name);
        if let Some(class) = classes.iter().find(|class| !class.is_expect()) {
            return Some(ClassifierDescriptor::Class(Rc::clone(class)));
        }
        if let Some(alias) = aliases.iter().find(|alias| !alias.is_expect) {
            return Some(ClassifierDescriptor::TypeAlias(Rc::clone(alias)));
        }
        classes
            .first()
            .map(|class| ClassifierDescriptor::Class(Rc::clone(class)))
            .or_else(|| aliases.first().map(|alias| ClassifierDescriptor::TypeAlias(Rc::clone(alias))))
    }

    fn contributed_functions(&self, name: Name, location: LookupLocation) -> Vec<Rc<FunctionDescriptor>> {
        memoized_functions(self, name, location)
    }

    fn contributed_variables(&self, name: Name, location: LookupLocation) -> Vec<Rc<PropertyDescriptor>> {
        memoized_variables(self, name, location)
    }

    /// Functions declared in this container's source, without anything
    /// inherited or synthesized.
    fn declared_functions(&self, name: Name) -> Vec<Rc<FunctionDescriptor>> {
        let core = self.core();
        core.declared_functions.invoke(
            &name,
            |&name| match core.main_scope() {
                Some(main) => copy_declared(&main.declared_functions(name), &self.owner()),
                None => resolve_declared_functions(self, name),
            },
            |_, _| Vec::new(),
        )
    }

    fn declared_properties(&self, name: Name) -> Vec<Rc<PropertyDescriptor>> {
        let core = self.core();
        core.declared_properties.invoke(
            &name,
            |&name| match core.main_scope() {
                Some(main) => copy_declared(&main.declared_properties(name), &self.owner()),
                None => resolve_declared_properties(self, name),
            },
            |_, _| Vec::new(),
        )
    }

    /// Descriptors of the declaration nodes passing the filters, in
    /// declaration order.
    fn descriptors_from_declared_elements(
        &self,
        kind_filter: DescriptorKindFilter,
        name_filter: &NameFilter<'_>,
        location: LookupLocation,
    ) -> Vec<DeclarationDescriptor> {
        let mut result: IndexSet<DeclarationDescriptor, FxBuildHasher> = IndexSet::default();
        for node in self.core().provider().declarations(kind_filter, name_filter) {
            if node.name().is_some_and(|name| !name_filter.accepts(name)) {
                continue;
            }
            match node {
                DeclarationNode::Class(class) => {
                    result.extend(classes_named(self, class.name).into_iter().map(DeclarationDescriptor::Class));
                }
                DeclarationNode::TypeAlias(alias) => {
                    result.extend(
                        type_aliases_named(self, alias.name)
                            .into_iter()
                            .map(DeclarationDescriptor::TypeAlias),
                    );
                }
                DeclarationNode::Function(function) => {
                    result.extend(
                        self.contributed_functions(function.name, location)
                            .into_iter()
                            .map(DeclarationDescriptor::Function),
                    );
                }
                DeclarationNode::Property(property) => {
                    result.extend(
                        self.contributed_variables(property.name, location)
                            .into_iter()
                            .map(DeclarationDescriptor::Property),
                    );
                }
                DeclarationNode::Parameter(parameter) => {
                    result.extend(
                        self.contributed_variables(parameter.name, location)
                            .into_iter()
                            .map(DeclarationDescriptor::Property),
                    );
                }
                DeclarationNode::Destructuring(destructuring) => {
                    for entry in &destructuring.entries {
                        if name_filter.accepts(entry.name) {
                            result.extend(
                                self.contributed_variables(entry.name, location)
                                    .into_iter()
                                    .map(DeclarationDescriptor::Property),
                            );
                        }
                    }
                }
                DeclarationNode::AnonymousInitializer(_) => {}
                DeclarationNode::Unsupported { node, kind } => {
                    internal_error(ResolveError::UnsupportedDeclaration {
                        kind,
                        node,
                        owner: self.owner().fq_name().to_string(),
                    });
                }
            }
        }
        result.into_iter().collect()
    }
}

/// Classes named `name`: declared ones first, then non-declared ones.
/// Not recorded as a lookup.
pub(crate) fn classes_named<S: LazyMemberScope + ?Sized>(scope: &S, name: Name) -> Vec<Rc<LazyClassDescriptor>> {
    scope.core().classes.invoke(
        &name,
        |&name| {
            let mut result: DescriptorSet<LazyClassDescriptor> = scope
                .core()
                .provider()
                .class_or_object_declarations(name)
                .iter()
                .map(|declaration| scope.create_class_descriptor(declaration))
                .collect();
            scope.non_declared_classes(name, &mut result);
            result.into_vec()
        },
        |_, _| Vec::new(),
    )
}

pub(crate) fn type_aliases_named<S: LazyMemberScope + ?Sized>(scope: &S, name: Name) -> Vec<Rc<TypeAliasDescriptor>> {
    let core = scope.core();
    core.type_aliases.invoke(
        &name,
        |&name| {
            let declarations = core.provider().type_alias_declarations(name);
            if declarations.is_empty() {
                return Vec::new();
            }
            let lexical = scope.scope_for_member_declaration_resolution();
            let owner = scope.owner();
            let ctx = &core.ctx;
            declarations
                .iter()
                .map(|declaration| ctx.resolver.resolve_type_alias(&owner, &lexical, declaration, &ctx.trace))
                .collect()
        },
        |_, _| Vec::new(),
    )
}

/// Memoized functions named `name`, recorded as a lookup from `location`.
pub(crate) fn memoized_functions<S: LazyMemberScope + ?Sized>(
    scope: &S,
    name: Name,
    location: LookupLocation,
) -> Vec<Rc<FunctionDescriptor>> {
    scope.record_lookup(name, location);
    scope.core().functions.invoke(
        &name,
        |&name| {
            let mut result: DescriptorSet<FunctionDescriptor> = scope.declared_functions(name).into_iter().collect();
            scope.non_declared_functions(name, &mut result);
            result.into_vec()
        },
        |_, _| Vec::new(),
    )
}

pub(crate) fn memoized_variables<S: LazyMemberScope + ?Sized>(
    scope: &S,
    name: Name,
    location: LookupLocation,
) -> Vec<Rc<PropertyDescriptor>> {
    scope.record_lookup(name, location);
    scope.core().properties.invoke(
        &name,
        |&name| {
            let mut result: DescriptorSet<PropertyDescriptor> = scope.declared_properties(name).into_iter().collect();
            scope.non_declared_properties(name, &mut result);
            result.into_vec()
        },
        |_, _| Vec::new(),
    )
}

fn resolve_declared_functions<S: LazyMemberScope + ?Sized>(scope: &S, name: Name) -> Vec<Rc<FunctionDescriptor>> {
    let core = scope.core();
    let declarations = core.provider().function_declarations(name);
    if declarations.is_empty() {
        return Vec::new();
    }
    let lexical = scope.scope_for_member_declaration_resolution();
    let owner = scope.owner();
    let ctx = &core.ctx;
    let result: DescriptorSet<FunctionDescriptor> = declarations
        .iter()
        .map(|declaration| ctx.resolver.resolve_function(&owner, &lexical, declaration, &ctx.trace))
        .collect();
    result.into_vec()
}

fn resolve_declared_properties<S: LazyMemberScope + ?Sized>(scope: &S, name: Name) -> Vec<Rc<PropertyDescriptor>> {
    let core = scope.core();
    let declarations = core.provider().property_declarations(name);
    let entries = core.provider().destructuring_entries(name);
    if declarations.is_empty() && entries.is_empty() {
        return Vec::new();
    }
    let lexical = scope.scope_for_member_declaration_resolution();
    let owner = scope.owner();
    let ctx = &core.ctx;
    let result: DescriptorSet<PropertyDescriptor> = declarations
        .iter()
        .chain(&entries)
        .map(|declaration| ctx.resolver.resolve_property(&owner, &lexical, declaration, &ctx.trace))
        .collect();
    result.into_vec()
}

/// Copies of a main scope's declared members re-owned by `owner`. Kind,
/// modality, visibility and source carry over.
fn copy_declared<D: CallableMember>(members: &[Rc<D>], owner: &DescriptorOwner) -> Vec<Rc<D>> {
    members
        .iter()
        .map(|member| {
            let data = member.member();
            Rc::new(member.with_member_data(data.derived(
                owner.clone(),
                data.kind,
                data.modality,
                data.visibility(),
                true,
            )))
        })
        .collect()
}
