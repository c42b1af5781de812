//! Member scope of a class body.
//!
//! On top of the declared members this scope assembles everything a class
//! has without declaring it:
//! - properties of `val`/`var` primary-constructor parameters;
//! - members of delegated interfaces;
//! - `componentN`/`copy` of data classes and the `Any` members of value
//!   and data classes;
//! - plugin and backend contributions;
//! - fake overrides for every inherited member nobody overrides.
//!
//! Each name is assembled once; unknown visibilities are inferred before a
//! member leaves the scope.

use crate::class_descriptor::{ClassContainer, LazyClassDescriptor};
use crate::context::ResolveContext;
use crate::data_class;
use crate::declarations::{ClassDeclaration, ClassKind, ParameterDeclaration};
use crate::delegation::generate_delegated_members;
use crate::descriptor_set::DescriptorSet;
use crate::descriptors::{
    CallableKind, CallableMember, ConstructorDescriptor, DeclarationDescriptor, DescriptorOwner,
    FunctionDescriptor, PropertyDescriptor, Visibility,
};
use crate::error::{ResolveError, internal_error};
use crate::functions_from_any::{add_function_from_any_if_needed, function_from_any_names};
use crate::jvm_signatures::report_platform_clashes;
use crate::kind_filter::{DescriptorKindFilter, NameFilter, filter_descriptors};
use crate::lexical_scope::LexicalScope;
use crate::lookup::{LookupLocation, ScopeKind, record_lookup};
use crate::member_scope::{
    LazyMemberScope, MemberScopeCore, NameSet, classes_named, memoized_functions,
    memoized_variables,
};
use crate::overriding::{
    OverridingStrategy, generate_overrides_in_function_group, resolve_unknown_visibility_for_member,
};
use crate::provider::{ClassDeclarationProvider, ClassMemberDeclarationProvider, DeclarationProvider};
use crate::types::{FqName, Type};
use indexmap::IndexSet;
use lzr_common::Name;
use lzr_common::diagnostics::diagnostic_codes;
use lzr_storage::LazyCell;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Supertype walks recurse once per hierarchy level.
fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, f)
}

type DescriptorIndex = IndexSet<DeclarationDescriptor, FxBuildHasher>;

/// A name set plus whether every contributing scope could answer.
#[derive(Clone)]
struct TrackedNames {
    names: NameSet,
    complete: bool,
}

impl TrackedNames {
    fn incomplete() -> TrackedNames {
        TrackedNames {
            names: NameSet::default(),
            complete: false,
        }
    }
}

pub struct ClassMemberScope {
    core: MemberScopeCore,
    class: Weak<LazyClassDescriptor>,
    fq_name: FqName,
    provider: Rc<ClassDeclarationProvider>,
    main_scope: Option<Rc<ClassMemberScope>>,
    primary_constructor: LazyCell<Option<Rc<ConstructorDescriptor>>>,
    secondary_constructors: LazyCell<Vec<Rc<ConstructorDescriptor>>>,
    all_descriptors: LazyCell<Vec<DeclarationDescriptor>>,
    all_classifier_descriptors: LazyCell<Vec<DeclarationDescriptor>>,
    function_names: LazyCell<TrackedNames>,
    variable_names: LazyCell<TrackedNames>,
    classifier_names: LazyCell<Option<NameSet>>,
    all_names: LazyCell<Option<NameSet>>,
}

impl ClassMemberScope {
    pub(crate) fn new(
        ctx: Rc<ResolveContext>,
        provider: Rc<ClassDeclarationProvider>,
        class: Weak<LazyClassDescriptor>,
        fq_name: FqName,
        main_scope: Option<Rc<ClassMemberScope>>,
    ) -> Rc<ClassMemberScope> {
        let storage = &ctx.storage;
        let declarations: Rc<dyn DeclarationProvider> = provider.clone();
        let main: Option<Rc<dyn LazyMemberScope>> = main_scope.clone().map(|main| main as Rc<dyn LazyMemberScope>);
        Rc::new(ClassMemberScope {
            primary_constructor: storage.lazy_cell(),
            secondary_constructors: storage.lazy_cell(),
            all_descriptors: storage.lazy_cell(),
            all_classifier_descriptors: storage.lazy_cell(),
            function_names: storage.lazy_cell(),
            variable_names: storage.lazy_cell(),
            classifier_names: storage.lazy_cell(),
            all_names: storage.lazy_cell(),
            core: MemberScopeCore::new(Rc::clone(&ctx), declarations, main),
            class,
            fq_name,
            provider,
            main_scope,
        })
    }

    fn ctx(&self) -> &ResolveContext {
        &self.core.ctx
    }

    /// The class this scope belongs to.
    pub fn class_descriptor(&self) -> Rc<LazyClassDescriptor> {
        match self.class.upgrade() {
            Some(class) => class,
            None => internal_error(ResolveError::ScopeInvalidated(format!(
                "member scope of {} outlived its class",
                self.fq_name
            ))),
        }
    }

    /// Whether this scope reuses another scope's declared members.
    pub fn is_view(&self) -> bool {
        self.main_scope.is_some()
    }

    fn supertype_scopes(&self, class: &LazyClassDescriptor) -> Vec<Rc<ClassMemberScope>> {
        class
            .supertype_entries()
            .iter()
            .filter_map(|entry| entry.ty.class_descriptor())
            .map(|supertype| supertype.member_scope())
            .collect()
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn primary_constructor(&self) -> Option<Rc<ConstructorDescriptor>> {
        if let Some(constructor) = self.main_scope.as_ref().and_then(|main| main.primary_constructor()) {
            return Some(constructor);
        }
        self.primary_constructor.get_or_compute(
            || self.resolve_primary_constructor(),
            |first_time| {
                if first_time {
                    debug!(target: "lzr::scope", class = %self.fq_name, "primary constructor requested while resolving it");
                }
                None
            },
        )
    }

    /// Secondary constructors, then the primary one.
    pub fn constructors(&self) -> Vec<Rc<ConstructorDescriptor>> {
        let mut result = match &self.main_scope {
            Some(main) => main.secondary_constructors(),
            None => self.secondary_constructors(),
        };
        result.extend(self.primary_constructor());
        result
    }

    fn secondary_constructors(&self) -> Vec<Rc<ConstructorDescriptor>> {
        self.secondary_constructors
            .get_or_compute(|| self.resolve_secondary_constructors(), |_| Vec::new())
    }

    fn resolve_primary_constructor(&self) -> Option<Rc<ConstructorDescriptor>> {
        let declaration = self.provider.corresponding_class_or_object()?;
        let explicit = declaration.has_explicit_primary_constructor();
        if !explicit {
            if declaration.is_expect() && declaration.kind != ClassKind::EnumEntry {
                return None;
            }
            if declaration.kind == ClassKind::Interface {
                return None;
            }
        }
        let class = self.class_descriptor();
        let ctx = self.ctx();
        let constructor = if explicit || can_have_declared_constructors(declaration.kind) {
            let scope = class.scopes().constructor_header();
            ctx.resolver
                .resolve_primary_constructor(&class, &scope, declaration, &ctx.trace)?
        } else {
            ctx.resolver
                .create_primary_constructor_for_object(&class, declaration, &ctx.trace)
        };
        self.set_deferred_return_type(&constructor);
        Some(constructor)
    }

    fn resolve_secondary_constructors(&self) -> Vec<Rc<ConstructorDescriptor>> {
        let class = self.class_descriptor();
        let ctx = self.ctx();
        let mut result = Vec::new();
        if let Some(declaration) = self.provider.corresponding_class_or_object() {
            if !declaration.secondary_constructors.is_empty() {
                let scope = class.scopes().constructor_header();
                for constructor in &declaration.secondary_constructors {
                    let descriptor = ctx
                        .resolver
                        .resolve_secondary_constructor(&class, &scope, constructor, &ctx.trace);
                    self.set_deferred_return_type(&descriptor);
                    result.push(descriptor);
                }
            }
        }
        ctx.synthetic.generate_synthetic_secondary_constructors(&class, &mut result);
        result
    }

    fn set_deferred_return_type(&self, constructor: &ConstructorDescriptor) {
        let class = self.class.clone();
        constructor.set_deferred_return_type(self.ctx().storage.recursion_tolerant_lazy_value(
            move || {
                class.upgrade().map_or_else(
                    || Type::error("constructed class was dropped"),
                    |class| class.default_type(),
                )
            },
            Type::error("recursive constructor return type"),
        ));
    }

    fn check_parameter_count(
        &self,
        constructor: &ConstructorDescriptor,
        parameters: &[ParameterDeclaration],
    ) {
        if constructor.value_parameters.len() != parameters.len() {
            internal_error(ResolveError::ParameterCountMismatch {
                class: self.fq_name.to_string(),
                from_descriptor: constructor.value_parameters.len(),
                from_declaration: parameters.len(),
            });
        }
    }

    // =========================================================================
    // Non-declared members
    // =========================================================================

    fn create_properties_from_primary_constructor_parameters(
        &self,
        class: &Rc<LazyClassDescriptor>,
        name: Name,
        result: &mut DescriptorSet<PropertyDescriptor>,
    ) {
        let Some(constructor) = self.primary_constructor() else {
            return;
        };
        let parameters = self.provider.primary_constructor_parameters();
        self.check_parameter_count(&constructor, parameters);
        let ctx = self.ctx();
        for parameter in constructor.value_parameters.iter().filter(|p| p.name == name) {
            let Some(declaration) = parameters.get(parameter.index) else {
                continue;
            };
            if !declaration.has_val_or_var() {
                continue;
            }
            let property = match ctx.trace.parameter_property(declaration.id) {
                Some(property) => property,
                None => ctx.resolver.resolve_primary_constructor_parameter_to_property(
                    class,
                    parameter,
                    &class.scopes().constructor_header(),
                    declaration,
                    &ctx.trace,
                ),
            };
            result.insert(property);
        }
    }

    fn generate_data_class_methods(
        &self,
        class: &Rc<LazyClassDescriptor>,
        result: &mut DescriptorSet<FunctionDescriptor>,
        name: Name,
        location: LookupLocation,
        from_supertypes: &[Rc<FunctionDescriptor>],
    ) {
        if !class.is_data() {
            return;
        }
        let Some(constructor) = self.primary_constructor() else {
            return;
        };
        let parameters = self.provider.primary_constructor_parameters();
        self.check_parameter_count(&constructor, parameters);

        if data_class::is_component_like(name) {
            let mut component_index = 0;
            for parameter in &constructor.value_parameters {
                let declares_property = parameters
                    .get(parameter.index)
                    .is_some_and(ParameterDeclaration::has_val_or_var);
                if !declares_property {
                    continue;
                }
                let properties = self.contributed_variables(parameter.name, location);
                let Some(property) = properties.iter().find(|property| property.receiver.is_none()) else {
                    continue;
                };
                component_index += 1;
                if name == data_class::component_name(component_index) {
                    result.insert(data_class::create_component_function(
                        class,
                        parameter,
                        property,
                        component_index,
                    ));
                    break;
                }
            }
        }

        if name == data_class::copy_name() {
            // Defaults of `copy` point at the parameter properties.
            for parameter in &constructor.value_parameters {
                self.contributed_variables(parameter.name, location);
            }
            let visibility = if self.ctx().options.language_features.copy_respects_constructor_visibility {
                constructor.visibility
            } else {
                Visibility::Public
            };
            result.insert(data_class::create_copy_function(
                class,
                &constructor.value_parameters,
                visibility,
                &self.ctx().trace,
            ));
        }

        if self.ctx().options.language_features.data_class_inheritance {
            add_function_from_any_if_needed(class, result, name, from_supertypes);
        }
    }

    fn generate_fake_overrides<D: CallableMember>(
        &self,
        class: &Rc<LazyClassDescriptor>,
        name: Name,
        from_supertypes: &[Rc<D>],
        result: &mut DescriptorSet<D>,
    ) {
        let from_current = result.to_vec();
        let mut strategy = ScopeOverridingStrategy {
            result: &mut *result,
            class: &**class,
            ctx: self.ctx(),
        };
        generate_overrides_in_function_group(name, from_supertypes, &from_current, class, &mut strategy);
        self.resolve_unknown_visibilities(class, &result.to_vec());
    }

    fn resolve_unknown_visibilities<D: CallableMember>(&self, class: &LazyClassDescriptor, members: &[Rc<D>]) {
        let trace = &self.ctx().trace;
        let span = class.declaration().span;
        let mut report = |member: &D| {
            trace.report_on(
                member.member().source,
                span,
                diagnostic_codes::CANNOT_INFER_VISIBILITY,
                &[&member.describe()],
            );
        };
        for member in members {
            resolve_unknown_visibility_for_member(&**member, &mut report);
        }
    }

    /// Inference for members handed out directly. Fake overrides and
    /// delegates were resolved when generated.
    fn resolve_unknown_visibilities_for_members<D: CallableMember>(&self, members: &[Rc<D>]) {
        if members.iter().all(|member| member.visibility() != Visibility::Unknown) {
            return;
        }
        let pending: Vec<Rc<D>> = members
            .iter()
            .filter(|member| !matches!(member.kind(), CallableKind::FakeOverride | CallableKind::Delegation))
            .cloned()
            .collect();
        self.resolve_unknown_visibilities(&self.class_descriptor(), &pending);
    }

    // =========================================================================
    // Descriptor listings
    // =========================================================================

    fn all_descriptors(&self) -> Vec<DeclarationDescriptor> {
        self.all_descriptors.get_or_compute_with_post(
            || self.compute_descriptors(&NameFilter::All),
            |first_time| {
                if first_time {
                    debug!(target: "lzr::scope", class = %self.fq_name, "descriptor listing requested while computing it");
                }
                Vec::new()
            },
            |all| {
                if self.ctx().options.report_jvm_signature_clashes {
                    report_platform_clashes(&self.class_descriptor(), all, &self.ctx().trace);
                }
            },
        )
    }

    fn all_classifier_descriptors(&self) -> Vec<DeclarationDescriptor> {
        self.all_classifier_descriptors
            .get_or_compute(|| self.compute_classifier_descriptors(&NameFilter::All), |_| Vec::new())
    }

    fn compute_descriptors(&self, name_filter: &NameFilter<'_>) -> Vec<DeclarationDescriptor> {
        let mut result: DescriptorIndex = self
            .descriptors_from_declared_elements(DescriptorKindFilter::ALL, name_filter, LookupLocation::WhenGetAllDescriptors)
            .into_iter()
            .collect();
        self.compute_extra_descriptors(&mut result, name_filter);
        result.into_iter().collect()
    }

    fn compute_classifier_descriptors(&self, name_filter: &NameFilter<'_>) -> Vec<DeclarationDescriptor> {
        let mut result: DescriptorIndex = self
            .descriptors_from_declared_elements(
                DescriptorKindFilter::CLASSIFIERS,
                name_filter,
                LookupLocation::WhenGetAllDescriptors,
            )
            .into_iter()
            .collect();
        self.add_synthetic_classifiers(&self.class_descriptor(), &mut result, name_filter);
        result.into_iter().collect()
    }

    fn compute_extra_descriptors(&self, result: &mut DescriptorIndex, name_filter: &NameFilter<'_>) {
        let class = self.class_descriptor();
        let location = LookupLocation::ForAlreadyTracked;
        let inherited: Vec<DeclarationDescriptor> = with_stack(|| {
            self.supertype_scopes(&class)
                .iter()
                .flat_map(|scope| scope.contributed_descriptors(DescriptorKindFilter::ALL, name_filter))
                .collect()
        });
        for descriptor in inherited {
            match descriptor {
                DeclarationDescriptor::Function(function) => self.add_functions(result, function.name(), location),
                DeclarationDescriptor::Property(property) => self.add_variables(result, property.name(), location),
                DeclarationDescriptor::Class(_) | DeclarationDescriptor::TypeAlias(_) => {}
            }
        }

        self.add_data_class_methods(&class, result, location, name_filter);

        let ctx = self.ctx();
        if class.is_value() || (class.is_data() && ctx.options.language_features.data_class_inheritance) {
            for name in function_from_any_names() {
                if name_filter.accepts(name) {
                    self.add_functions(result, name, location);
                }
            }
        }
        let function_names = ctx
            .synthetic
            .synthetic_function_names(&class)
            .into_iter()
            .chain(ctx.class_parts.additional_function_names(&class));
        for name in function_names {
            if name_filter.accepts(name) {
                self.add_functions(result, name, location);
            }
        }
        for name in ctx.synthetic.synthetic_property_names(&class) {
            if name_filter.accepts(name) {
                self.add_variables(result, name, location);
            }
        }
        self.add_synthetic_classifiers(&class, result, name_filter);
    }

    fn add_functions(&self, result: &mut DescriptorIndex, name: Name, location: LookupLocation) {
        result.extend(
            self.contributed_functions(name, location)
                .into_iter()
                .map(DeclarationDescriptor::Function),
        );
    }

    fn add_variables(&self, result: &mut DescriptorIndex, name: Name, location: LookupLocation) {
        result.extend(
            self.contributed_variables(name, location)
                .into_iter()
                .map(DeclarationDescriptor::Property),
        );
    }

    /// `componentN` for every N that exists, then `copy`.
    fn add_data_class_methods(
        &self,
        class: &LazyClassDescriptor,
        result: &mut DescriptorIndex,
        location: LookupLocation,
        name_filter: &NameFilter<'_>,
    ) {
        if !class.is_data() || class.kind() != ClassKind::Class || self.primary_constructor().is_none() {
            return;
        }
        let mut index = 1;
        loop {
            let name = data_class::component_name(index);
            let functions = self.contributed_functions(name, location);
            if functions.is_empty() {
                break;
            }
            if name_filter.accepts(name) {
                result.extend(functions.into_iter().map(DeclarationDescriptor::Function));
            }
            index += 1;
        }
        let copy = data_class::copy_name();
        if name_filter.accepts(copy) {
            self.add_functions(result, copy, location);
        }
    }

    fn add_synthetic_classifiers(
        &self,
        class: &LazyClassDescriptor,
        result: &mut DescriptorIndex,
        name_filter: &NameFilter<'_>,
    ) {
        let ctx = self.ctx();
        let names = ctx
            .synthetic
            .synthetic_companion_object_name(class)
            .into_iter()
            .chain(ctx.synthetic.synthetic_nested_class_names(class));
        for name in names {
            if name_filter.accepts(name) {
                result.extend(classes_named(self, name).into_iter().map(DeclarationDescriptor::Class));
            }
        }
    }

    // =========================================================================
    // Name sets
    // =========================================================================

    fn tracked_function_names(&self) -> TrackedNames {
        self.function_names.get_or_compute(
            || {
                let class = self.class_descriptor();
                let ctx = self.ctx();
                let mut names: IndexSet<Name, FxBuildHasher> = self.provider.declaration_names().into_iter().collect();
                names.extend(ctx.synthetic.synthetic_function_names(&class));
                names.extend(ctx.class_parts.additional_function_names(&class));
                names.extend(self.data_class_related_function_names(&class));
                if class.is_value() || (class.is_data() && ctx.options.language_features.data_class_inheritance) {
                    names.extend(function_from_any_names());
                }
                let complete = self.extend_with_supertype_names(&class, &mut names, ClassMemberScope::tracked_function_names);
                TrackedNames {
                    names: Rc::new(names),
                    complete,
                }
            },
            |_| TrackedNames::incomplete(),
        )
    }

    fn tracked_variable_names(&self) -> TrackedNames {
        self.variable_names.get_or_compute(
            || {
                let class = self.class_descriptor();
                let mut names: IndexSet<Name, FxBuildHasher> = self.provider.declaration_names().into_iter().collect();
                names.extend(self.ctx().synthetic.synthetic_property_names(&class));
                let complete = self.extend_with_supertype_names(&class, &mut names, ClassMemberScope::tracked_variable_names);
                TrackedNames {
                    names: Rc::new(names),
                    complete,
                }
            },
            |_| TrackedNames::incomplete(),
        )
    }

    /// Adds the supertypes' names; `false` when some of them are unknown.
    fn extend_with_supertype_names(
        &self,
        class: &LazyClassDescriptor,
        names: &mut IndexSet<Name, FxBuildHasher>,
        names_of: fn(&ClassMemberScope) -> TrackedNames,
    ) -> bool {
        class.supertype_entries();
        let mut complete = class.are_supertypes_resolved();
        with_stack(|| {
            for scope in self.supertype_scopes(class) {
                let inherited = names_of(&*scope);
                complete &= inherited.complete;
                names.extend(inherited.names.iter().copied());
            }
        });
        complete
    }

    /// Every `componentN` a data class can have, and `copy`.
    fn data_class_related_function_names(&self, class: &LazyClassDescriptor) -> Vec<Name> {
        if !class.is_data() {
            return Vec::new();
        }
        let properties = self
            .provider
            .primary_constructor_parameters()
            .iter()
            .filter(|parameter| parameter.has_val_or_var())
            .count();
        let mut names: Vec<Name> = (1..=properties).map(data_class::component_name).collect();
        names.push(data_class::copy_name());
        names
    }

    fn compute_classifier_names(&self) -> Option<NameSet> {
        let class = self.class_descriptor();
        let ctx = self.ctx();
        let mut names: IndexSet<Name, FxBuildHasher> = IndexSet::default();
        let entries = class.supertype_entries();
        if !class.are_supertypes_resolved() {
            return None;
        }
        for entry in entries.iter() {
            match entry.ty.class_descriptor() {
                Some(supertype) => {
                    let inherited = with_stack(|| supertype.member_scope().classifier_names())?;
                    names.extend(inherited.iter().copied());
                }
                None if entry.ty.is_error() => return None,
                None => {}
            }
        }
        names.extend(self.provider.declaration_names());
        names.extend(ctx.synthetic.possible_synthetic_nested_class_names(&class)?);
        names.extend(ctx.synthetic.synthetic_companion_object_name(&class));
        Some(Rc::new(names))
    }

    /// Union of every name set, or `None` if any of them is unknown.
    pub fn all_names(&self) -> Option<NameSet> {
        self.all_names.get_or_compute(
            || {
                let classifiers = self.classifier_names()?;
                let functions = self.tracked_function_names();
                let variables = self.tracked_variable_names();
                if !functions.complete || !variables.complete {
                    return None;
                }
                let mut names = (*classifiers).clone();
                names.extend(functions.names.iter().copied());
                names.extend(variables.names.iter().copied());
                Some(Rc::new(names))
            },
            |_| None,
        )
    }
}

fn can_have_declared_constructors(kind: ClassKind) -> bool {
    matches!(kind, ClassKind::Class | ClassKind::EnumClass | ClassKind::AnnotationClass)
}

impl LazyMemberScope for ClassMemberScope {
    fn core(&self) -> &MemberScopeCore {
        &self.core
    }

    fn owner(&self) -> DescriptorOwner {
        DescriptorOwner::for_class(&self.class_descriptor())
    }

    fn scope_for_member_declaration_resolution(&self) -> Rc<LexicalScope> {
        self.class_descriptor().scopes().member_declaration()
    }

    fn create_class_descriptor(&self, declaration: &Rc<ClassDeclaration>) -> Rc<LazyClassDescriptor> {
        // A view hands out the main scope's nested classes.
        if let Some(main) = &self.main_scope {
            let existing = classes_named(&**main, declaration.name)
                .into_iter()
                .find(|class| Rc::ptr_eq(class.declaration(), declaration));
            if let Some(existing) = existing {
                return existing;
            }
        }
        LazyClassDescriptor::new(
            Rc::clone(&self.core.ctx),
            ClassContainer::Class(self.class.clone()),
            &self.fq_name,
            Rc::clone(declaration),
            false,
        )
    }

    fn non_declared_classes(&self, name: Name, result: &mut DescriptorSet<LazyClassDescriptor>) {
        let class = self.class_descriptor();
        let ctx = self.ctx();
        let declares_companion = self
            .provider
            .corresponding_class_or_object()
            .is_some_and(|declaration| declaration.companion_declaration().is_some());
        if !declares_companion && ctx.synthetic.synthetic_companion_object_name(&class) == Some(name) {
            result.extend(class.companion_object());
        }
        ctx.synthetic.generate_synthetic_classes(&class, name, result);
    }

    fn non_declared_functions(&self, name: Name, result: &mut DescriptorSet<FunctionDescriptor>) {
        let class = self.class_descriptor();
        let location = LookupLocation::ForAlreadyTracked;
        let from_supertypes: Vec<Rc<FunctionDescriptor>> = with_stack(|| {
            self.supertype_scopes(&class)
                .iter()
                .flat_map(|scope| scope.contributed_functions(name, location))
                .collect()
        });
        let delegated = generate_delegated_members(&class, name, result, |scope: &ClassMemberScope, name| {
            scope.contributed_functions(name, location)
        });
        result.extend(delegated);

        self.generate_data_class_methods(&class, result, name, location, &from_supertypes);
        if class.is_value() {
            add_function_from_any_if_needed(&class, result, name, &from_supertypes);
        }
        let ctx = self.ctx();
        ctx.synthetic
            .generate_synthetic_methods(&class, name, &from_supertypes, result);
        ctx.class_parts
            .generate_additional_methods(&class, result, name, location, &from_supertypes);

        self.generate_fake_overrides(&class, name, &from_supertypes, result);
    }

    fn non_declared_properties(&self, name: Name, result: &mut DescriptorSet<PropertyDescriptor>) {
        let class = self.class_descriptor();
        let location = LookupLocation::ForAlreadyTracked;
        self.create_properties_from_primary_constructor_parameters(&class, name, result);

        let from_supertypes: Vec<Rc<PropertyDescriptor>> = with_stack(|| {
            self.supertype_scopes(&class)
                .iter()
                .flat_map(|scope| scope.contributed_variables(name, location))
                .collect()
        });
        let delegated = generate_delegated_members(&class, name, result, |scope: &ClassMemberScope, name| {
            scope.contributed_variables(name, location)
        });
        result.extend(delegated);

        self.ctx()
            .synthetic
            .generate_synthetic_properties(&class, name, &from_supertypes, result);

        self.generate_fake_overrides(&class, name, &from_supertypes, result);
    }

    fn record_lookup(&self, name: Name, location: LookupLocation) {
        record_lookup(&*self.ctx().lookups, location, &self.fq_name, ScopeKind::Classifier, name);
    }

    fn contributed_functions(&self, name: Name, location: LookupLocation) -> Vec<Rc<FunctionDescriptor>> {
        let functions = memoized_functions(self, name, location);
        self.resolve_unknown_visibilities_for_members(&functions);
        functions
    }

    fn contributed_variables(&self, name: Name, location: LookupLocation) -> Vec<Rc<PropertyDescriptor>> {
        let variables = memoized_variables(self, name, location);
        self.resolve_unknown_visibilities_for_members(&variables);
        variables
    }

    /// A name filter that accepts everything (or a listing already under
    /// way) serves from the cached listing; other filters compute a partial
    /// listing that is not cached.
    fn contributed_descriptors(
        &self,
        kind_filter: DescriptorKindFilter,
        name_filter: &NameFilter<'_>,
    ) -> Vec<DeclarationDescriptor> {
        let cell = if kind_filter == DescriptorKindFilter::CLASSIFIERS {
            &self.all_classifier_descriptors
        } else {
            &self.all_descriptors
        };
        let use_cached = name_filter.is_all() || cell.is_computed() || cell.is_computing();
        let descriptors = match (kind_filter == DescriptorKindFilter::CLASSIFIERS, use_cached) {
            (true, true) => self.all_classifier_descriptors(),
            (true, false) => self
                .ctx()
                .storage
                .compute(|| self.compute_classifier_descriptors(name_filter)),
            (false, true) => self.all_descriptors(),
            (false, false) => self.ctx().storage.compute(|| self.compute_descriptors(name_filter)),
        };
        filter_descriptors(&descriptors, kind_filter, name_filter)
    }

    fn function_names(&self) -> NameSet {
        self.tracked_function_names().names
    }

    fn variable_names(&self) -> NameSet {
        self.tracked_variable_names().names
    }

    fn classifier_names(&self) -> Option<NameSet> {
        self.classifier_names.get_or_compute(|| self.compute_classifier_names(), |_| None)
    }

    fn definitely_does_not_contain_name(&self, name: Name) -> bool {
        self.all_names().is_some_and(|names| !names.contains(&name))
    }
}

/// Collects fake overrides into the scope's result and reports conflicts
/// into the trace.
struct ScopeOverridingStrategy<'a, D: CallableMember> {
    result: &'a mut DescriptorSet<D>,
    class: &'a LazyClassDescriptor,
    ctx: &'a ResolveContext,
}

impl<D: CallableMember> OverridingStrategy<D> for ScopeOverridingStrategy<'_, D> {
    fn add_fake_override(&mut self, fake_override: Rc<D>) {
        trace!(target: "lzr::override", class = %self.class.fq_name(), member = %fake_override.describe(), "fake override");
        self.result.insert(fake_override);
    }

    fn override_conflict(&mut self, from_super: &Rc<D>, from_current: &Rc<D>) {
        if !self.ctx.options.report_conflicting_overloads {
            return;
        }
        let overloaded = from_super.describe();
        self.ctx.trace.report_on_related(
            from_current.member().source,
            self.class.declaration().span,
            diagnostic_codes::CONFLICTING_OVERLOADS,
            &[&from_current.describe(), &overloaded],
            &[(from_super.member().source, format!("{overloaded} is declared here"))],
        );
    }

    fn inheritance_conflict(&mut self, first: &Rc<D>, second: &Rc<D>) {
        if !self.ctx.options.report_inheritance_conflicts {
            return;
        }
        let (first_text, second_text) = (first.describe(), second.describe());
        self.ctx.trace.report_on_related(
            None,
            self.class.declaration().span,
            diagnostic_codes::CONFLICTING_INHERITED_MEMBERS,
            &[self.class.fq_name().as_str(), &first_text, &second_text],
            &[
                (first.member().source, format!("{first_text} is inherited from here")),
                (second.member().source, format!("{second_text} is inherited from here")),
            ],
        );
    }
}

impl fmt::Display for ClassMemberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lazy scope for class {}", self.fq_name)
    }
}

impl fmt::Debug for ClassMemberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
