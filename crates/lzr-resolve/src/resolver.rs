//! Turning declaration nodes into descriptors.
//!
//! [`DescriptorResolver`] is the seam to the type checker. Its provided
//! methods implement a complete, if simple, resolution: type references are
//! looked up through the lexical scope chain, with built-in types as the last
//! resort. Embedders override individual methods to plug in a real type
//! checker or to observe resolution.

use crate::class_descriptor::LazyClassDescriptor;
use crate::declarations::{
    ClassDeclaration, ClassKind, ClassModifiers, ConstructorDeclaration, FunctionDeclaration,
    MemberModifiers, ParameterDeclaration, PropertyDeclaration, TypeAliasDeclaration, TypeRef,
    ValOrVar,
};
use crate::descriptors::{
    CallableKind, ConstructorDescriptor, DescriptorOwner, FunctionDescriptor, MemberData,
    Modality, PropertyDescriptor, SourceElement, TypeAliasDescriptor, ValueParameterDescriptor,
    Visibility,
};
use crate::lexical_scope::{LexicalClassifier, LexicalScope, LexicalScopeKind};
use crate::lookup::LookupLocation;
use crate::trace::DiagnosticTrace;
use crate::types::{BUILTIN_TYPE_NAMES, Type};
use lzr_common::diagnostics::diagnostic_codes;
use std::rc::Rc;

/// One resolved entry of a supertype list.
#[derive(Clone, Debug)]
pub struct ResolvedSupertype {
    pub ty: Type,
    pub by_delegation: bool,
}

pub trait DescriptorResolver {
    fn resolve_type(&self, scope: &LexicalScope, type_ref: &TypeRef, trace: &DiagnosticTrace) -> Type {
        resolve_type_in_scope(scope, type_ref, trace)
    }

    /// Supertype list of `class`, resolved in its header scope.
    fn resolve_supertypes(
        &self,
        class: &Rc<LazyClassDescriptor>,
        scope: &Rc<LexicalScope>,
        trace: &DiagnosticTrace,
    ) -> Vec<ResolvedSupertype> {
        class
            .declaration()
            .supertypes
            .iter()
            .map(|entry| ResolvedSupertype {
                ty: self.resolve_type(scope, &entry.ty, trace),
                by_delegation: entry.by_delegation,
            })
            .collect()
    }

    fn resolve_function(
        &self,
        owner: &DescriptorOwner,
        scope: &Rc<LexicalScope>,
        declaration: &FunctionDeclaration,
        trace: &DiagnosticTrace,
    ) -> Rc<FunctionDescriptor> {
        let scope = if declaration.type_parameters.is_empty() {
            Rc::clone(scope)
        } else {
            LexicalScope::with_type_parameters(
                Rc::clone(scope),
                LexicalScopeKind::FunctionHeader,
                owner.fq_name(),
                declaration.type_parameters.clone(),
            )
        };
        let receiver = declaration
            .receiver
            .as_ref()
            .map(|receiver| self.resolve_type(&scope, receiver, trace));
        let value_parameters = declaration
            .parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| self.resolve_value_parameter(&scope, parameter, index, trace))
            .collect();
        let return_type = declaration
            .return_type
            .as_ref()
            .map_or_else(Type::unit, |ty| self.resolve_type(&scope, ty, trace));

        let member = MemberData::new(
            declaration.name,
            owner.clone(),
            CallableKind::Declaration,
            member_modality(owner, declaration.modifiers, declaration.has_body),
            member_visibility(declaration.visibility, declaration.modifiers),
        )
        .with_source(Some(SourceElement {
            node: declaration.id,
            span: declaration.span,
        }))
        .expect(is_expect_member(owner, declaration.modifiers));

        let mut function = FunctionDescriptor::new(member, receiver, value_parameters, return_type)
            .with_type_parameters(declaration.type_parameters.clone());
        if declaration.modifiers.contains(MemberModifiers::OPERATOR) {
            function = function.operator();
        }
        Rc::new(function)
    }

    fn resolve_property(
        &self,
        owner: &DescriptorOwner,
        scope: &Rc<LexicalScope>,
        declaration: &PropertyDeclaration,
        trace: &DiagnosticTrace,
    ) -> Rc<PropertyDescriptor> {
        let receiver = declaration
            .receiver
            .as_ref()
            .map(|receiver| self.resolve_type(scope, receiver, trace));
        let ty = match &declaration.ty {
            Some(ty) => self.resolve_type(scope, ty, trace),
            None => Type::error(&format!("type of '{}' is not inferred", declaration.name)),
        };
        let member = MemberData::new(
            declaration.name,
            owner.clone(),
            CallableKind::Declaration,
            member_modality(owner, declaration.modifiers, false),
            member_visibility(declaration.visibility, declaration.modifiers),
        )
        .with_source(Some(SourceElement {
            node: declaration.id,
            span: declaration.span,
        }))
        .expect(is_expect_member(owner, declaration.modifiers));
        Rc::new(PropertyDescriptor::new(member, receiver, ty, declaration.is_var))
    }

    fn resolve_type_alias(
        &self,
        owner: &DescriptorOwner,
        scope: &Rc<LexicalScope>,
        declaration: &TypeAliasDeclaration,
        trace: &DiagnosticTrace,
    ) -> Rc<TypeAliasDescriptor> {
        Rc::new(TypeAliasDescriptor {
            name: declaration.name,
            owner: owner.clone(),
            visibility: declaration.visibility.unwrap_or(Visibility::Public),
            is_expect: declaration.is_expect,
            expanded: self.resolve_type(scope, &declaration.target, trace),
            source: Some(SourceElement {
                node: declaration.id,
                span: declaration.span,
            }),
        })
    }

    /// Primary constructor of a class that has or may declare one. `None`
    /// means the class gets no constructor.
    fn resolve_primary_constructor(
        &self,
        class: &Rc<LazyClassDescriptor>,
        scope: &Rc<LexicalScope>,
        declaration: &ClassDeclaration,
        trace: &DiagnosticTrace,
    ) -> Option<Rc<ConstructorDescriptor>> {
        let explicit = declaration.primary_constructor.as_ref();
        let value_parameters = explicit.map_or_else(Vec::new, |ctor| {
            self.resolve_value_parameters(scope, &ctor.parameters, trace)
        });
        let visibility = explicit
            .and_then(|ctor| ctor.visibility)
            .unwrap_or_else(|| default_constructor_visibility(declaration));
        let source = explicit.map_or(
            SourceElement {
                node: declaration.id,
                span: declaration.span,
            },
            |ctor| SourceElement {
                node: ctor.id,
                span: ctor.span,
            },
        );
        Some(Rc::new(
            ConstructorDescriptor::new(
                DescriptorOwner::for_class(class),
                true,
                visibility,
                value_parameters,
            )
            .with_source(Some(source)),
        ))
    }

    fn resolve_secondary_constructor(
        &self,
        class: &Rc<LazyClassDescriptor>,
        scope: &Rc<LexicalScope>,
        constructor: &ConstructorDeclaration,
        trace: &DiagnosticTrace,
    ) -> Rc<ConstructorDescriptor> {
        let value_parameters = self.resolve_value_parameters(scope, &constructor.parameters, trace);
        let visibility = constructor
            .visibility
            .unwrap_or_else(|| default_constructor_visibility(class.declaration()));
        Rc::new(
            ConstructorDescriptor::new(
                DescriptorOwner::for_class(class),
                false,
                visibility,
                value_parameters,
            )
            .with_source(Some(SourceElement {
                node: constructor.id,
                span: constructor.span,
            })),
        )
    }

    /// Implicit constructor of an object or enum entry: private, no parameters.
    fn create_primary_constructor_for_object(
        &self,
        class: &Rc<LazyClassDescriptor>,
        declaration: &ClassDeclaration,
        _trace: &DiagnosticTrace,
    ) -> Rc<ConstructorDescriptor> {
        Rc::new(
            ConstructorDescriptor::new(DescriptorOwner::for_class(class), true, Visibility::Private, Vec::new())
                .with_source(Some(SourceElement {
                    node: declaration.id,
                    span: declaration.span,
                })),
        )
    }

    /// Property declared by a `val`/`var` primary-constructor parameter. The
    /// binding is recorded in the trace so later lookups reuse it.
    fn resolve_primary_constructor_parameter_to_property(
        &self,
        class: &Rc<LazyClassDescriptor>,
        parameter: &ValueParameterDescriptor,
        _scope: &Rc<LexicalScope>,
        declaration: &ParameterDeclaration,
        trace: &DiagnosticTrace,
    ) -> Rc<PropertyDescriptor> {
        let owner = DescriptorOwner::for_class(class);
        let member = MemberData::new(
            parameter.name,
            owner.clone(),
            CallableKind::Declaration,
            member_modality(&owner, declaration.modifiers, true),
            member_visibility(declaration.visibility, declaration.modifiers),
        )
        .with_source(Some(SourceElement {
            node: declaration.id,
            span: declaration.span,
        }));
        let property = Rc::new(PropertyDescriptor::new(
            member,
            None,
            parameter.ty.clone(),
            declaration.val_or_var == Some(ValOrVar::Var),
        ));
        trace.record_parameter_property(declaration.id, Rc::clone(&property));
        property
    }

    fn resolve_value_parameter(
        &self,
        scope: &Rc<LexicalScope>,
        parameter: &ParameterDeclaration,
        index: usize,
        trace: &DiagnosticTrace,
    ) -> ValueParameterDescriptor {
        ValueParameterDescriptor {
            name: parameter.name,
            index,
            ty: self.resolve_type(scope, &parameter.ty, trace),
            declares_default_value: parameter.has_default,
            default_from_property: None,
            source: Some(SourceElement {
                node: parameter.id,
                span: parameter.span,
            }),
        }
    }

    fn resolve_value_parameters(
        &self,
        scope: &Rc<LexicalScope>,
        parameters: &[ParameterDeclaration],
        trace: &DiagnosticTrace,
    ) -> Vec<ValueParameterDescriptor> {
        parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| self.resolve_value_parameter(scope, parameter, index, trace))
            .collect()
    }
}

/// Resolver using only the provided behavior.
#[derive(Debug, Default)]
pub struct DefaultDescriptorResolver;

impl DescriptorResolver for DefaultDescriptorResolver {}

/// Look `type_ref` up through `scope`, falling back to built-in types.
/// Unresolved names become error types; they are reported unless the scope
/// is a recursion stand-in.
pub fn resolve_type_in_scope(scope: &LexicalScope, type_ref: &TypeRef, trace: &DiagnosticTrace) -> Type {
    let name = type_ref.name;
    let text = name.as_str();
    let resolved = match scope.find_classifier(name, LookupLocation::NoLocation) {
        Some(LexicalClassifier::Class(class)) => Type::class(&class),
        Some(LexicalClassifier::TypeAlias(alias)) => alias.expanded.clone(),
        Some(LexicalClassifier::TypeParameter(name)) => Type::TypeParameter {
            name,
            nullable: false,
        },
        None if BUILTIN_TYPE_NAMES.contains(&&*text) => Type::builtin(&text),
        None => {
            if !scope.contains_error() {
                trace.report_at(
                    type_ref.span,
                    diagnostic_codes::UNRESOLVED_REFERENCE,
                    &[&*text],
                );
            }
            return Type::error(&text);
        }
    };
    let nullable = type_ref.nullable || resolved.is_nullable();
    resolved.with_nullability(nullable)
}

fn member_visibility(explicit: Option<Visibility>, modifiers: MemberModifiers) -> Visibility {
    match explicit {
        Some(visibility) => visibility,
        None if modifiers.contains(MemberModifiers::OVERRIDE) => Visibility::Unknown,
        None => Visibility::Public,
    }
}

fn member_modality(owner: &DescriptorOwner, modifiers: MemberModifiers, has_body: bool) -> Modality {
    if modifiers.contains(MemberModifiers::FINAL) {
        return Modality::Final;
    }
    if modifiers.contains(MemberModifiers::ABSTRACT) {
        return Modality::Abstract;
    }
    if modifiers.contains(MemberModifiers::OPEN) {
        return Modality::Open;
    }
    let in_interface = owner
        .class()
        .is_some_and(|class| class.kind() == ClassKind::Interface);
    if in_interface {
        return if has_body { Modality::Open } else { Modality::Abstract };
    }
    if modifiers.contains(MemberModifiers::OVERRIDE) {
        Modality::Open
    } else {
        Modality::Final
    }
}

fn is_expect_member(owner: &DescriptorOwner, modifiers: MemberModifiers) -> bool {
    modifiers.contains(MemberModifiers::EXPECT) || owner.class().is_some_and(|class| class.is_expect())
}

fn default_constructor_visibility(declaration: &ClassDeclaration) -> Visibility {
    if declaration.kind == ClassKind::EnumClass {
        Visibility::Private
    } else if declaration.modifiers.contains(ClassModifiers::SEALED) {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
