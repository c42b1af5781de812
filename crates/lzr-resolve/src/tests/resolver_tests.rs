use super::*;
use crate::context::ResolveContext;
use crate::declarations::SourceFile;
use crate::descriptors::CallableMember;
use crate::package_scope::PackageMemberScope;
use crate::types::FqName;
use lzr_common::{Name, Span};

fn package(files: Vec<SourceFile>) -> Rc<PackageMemberScope> {
    PackageMemberScope::from_files(Rc::new(ResolveContext::new("resolver.kt")), "app", &files)
}

fn empty_package() -> Rc<PackageMemberScope> {
    package(vec![SourceFile::new("resolver.kt", "app")])
}

#[test]
fn builtin_types_resolve_with_nullability() {
    let package = empty_package();
    let trace = DiagnosticTrace::new("resolver.kt");
    let ty = resolve_type_in_scope(&package.lexical_scope(), &TypeRef::named("String").nullable(), &trace);
    assert_eq!(ty, Type::string().with_nullability(true));
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn unresolved_types_are_reported_at_the_reference() {
    let package = empty_package();
    let trace = DiagnosticTrace::new("resolver.kt");
    let reference = TypeRef::named("Missing").at(Span::new(40, 7));
    let ty = resolve_type_in_scope(&package.lexical_scope(), &reference, &trace);
    assert!(ty.is_error());
    let diagnostics = trace.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::UNRESOLVED_REFERENCE);
    assert_eq!(diagnostics[0].start, 40);
    assert_eq!(diagnostics[0].message_text, "Unresolved reference: Missing");
}

#[test]
fn error_scopes_do_not_report() {
    let trace = DiagnosticTrace::new("resolver.kt");
    let scope = LexicalScope::error(&FqName::new("app.C"));
    let ty = resolve_type_in_scope(&scope, &TypeRef::named("Missing"), &trace);
    assert!(ty.is_error());
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn declared_classes_and_aliases_win_over_builtins() {
    let package = package(vec![
        SourceFile::new("resolver.kt", "app")
            .with_class(ClassDeclaration::class("Int"))
            .with(crate::declarations::DeclarationNode::type_alias(TypeAliasDeclaration::new(
                "Text",
                TypeRef::named("String"),
            ))),
    ]);
    let trace = DiagnosticTrace::new("resolver.kt");
    let scope = package.lexical_scope();
    let int = resolve_type_in_scope(&scope, &TypeRef::named("Int"), &trace);
    assert_eq!(int.erased(), "app.Int");
    assert!(int.class_descriptor().is_some());
    let text = resolve_type_in_scope(&scope, &TypeRef::named("Text").nullable(), &trace);
    assert_eq!(text, Type::string().with_nullability(true));
}

#[test]
fn functions_default_to_unit_final_and_public() {
    let package = empty_package();
    let owner = DescriptorOwner::Package(package.fq_name().clone());
    let declaration = FunctionDeclaration::new("run")
        .with_parameter(ParameterDeclaration::new("times", TypeRef::named("Int")).with_default());
    let function = DefaultDescriptorResolver.resolve_function(
        &owner,
        &package.lexical_scope(),
        &declaration,
        &DiagnosticTrace::new("resolver.kt"),
    );
    assert_eq!(function.return_type, Type::unit());
    assert_eq!(function.modality(), Modality::Final);
    assert_eq!(function.visibility(), Visibility::Public);
    assert_eq!(function.kind(), CallableKind::Declaration);
    assert!(function.value_parameters[0].declares_default_value);
    assert_eq!(function.member().source.map(|source| source.node), Some(declaration.id));
}

#[test]
fn function_type_parameters_are_in_scope_for_its_signature() {
    let package = empty_package();
    let owner = DescriptorOwner::Package(package.fq_name().clone());
    let trace = DiagnosticTrace::new("resolver.kt");
    let declaration = FunctionDeclaration::new("identity")
        .with_type_parameter("T")
        .with_parameter(ParameterDeclaration::new("value", TypeRef::named("T")))
        .returning(TypeRef::named("T"));
    let function = DefaultDescriptorResolver.resolve_function(&owner, &package.lexical_scope(), &declaration, &trace);
    assert_eq!(
        function.return_type,
        Type::TypeParameter {
            name: Name::identifier("T"),
            nullable: false,
        }
    );
    assert_eq!(function.type_parameters, vec![Name::identifier("T")]);
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn override_without_visibility_is_unknown_and_open() {
    let package = empty_package();
    let owner = DescriptorOwner::Package(package.fq_name().clone());
    let declaration = FunctionDeclaration::new("toString")
        .with_modifiers(MemberModifiers::OVERRIDE | MemberModifiers::OPERATOR)
        .returning(TypeRef::named("String"));
    let function = DefaultDescriptorResolver.resolve_function(
        &owner,
        &package.lexical_scope(),
        &declaration,
        &DiagnosticTrace::new("resolver.kt"),
    );
    assert_eq!(function.visibility(), Visibility::Unknown);
    assert_eq!(function.modality(), Modality::Open);
    assert!(function.is_operator);
}

#[test]
fn interface_members_are_abstract_without_body() {
    let package = package(vec![
        SourceFile::new("resolver.kt", "app").with_class(ClassDeclaration::interface("Shape")),
    ]);
    let shape = package.class("Shape").expect("Shape is declared");
    let owner = DescriptorOwner::for_class(&shape);
    let scope = shape.scopes().member_declaration();
    let trace = DiagnosticTrace::new("resolver.kt");
    let abstract_fn = DefaultDescriptorResolver.resolve_function(
        &owner,
        &scope,
        &FunctionDeclaration::new("area").without_body(),
        &trace,
    );
    let default_fn = DefaultDescriptorResolver.resolve_function(&owner, &scope, &FunctionDeclaration::new("describe"), &trace);
    let property = DefaultDescriptorResolver.resolve_property(
        &owner,
        &scope,
        &PropertyDeclaration::val("name", TypeRef::named("String")),
        &trace,
    );
    assert_eq!(abstract_fn.modality(), Modality::Abstract);
    assert_eq!(default_fn.modality(), Modality::Open);
    assert_eq!(property.modality(), Modality::Abstract);
}

#[test]
fn properties_without_type_get_an_error_type() {
    let package = empty_package();
    let owner = DescriptorOwner::Package(package.fq_name().clone());
    let trace = DiagnosticTrace::new("resolver.kt");
    let property = DefaultDescriptorResolver.resolve_property(
        &owner,
        &package.lexical_scope(),
        &PropertyDeclaration::inferred("lazyValue"),
        &trace,
    );
    assert!(property.ty.is_error());
    assert!(trace.diagnostics().is_empty());
}

#[test]
fn constructor_visibility_defaults_follow_class_kind() {
    let package = package(vec![
        SourceFile::new("resolver.kt", "app")
            .with_class(ClassDeclaration::new("Color", ClassKind::EnumClass))
            .with_class(ClassDeclaration::class("Expr").with_modifiers(ClassModifiers::SEALED))
            .with_class(ClassDeclaration::class("Plain")),
    ]);
    let visibility_of = |name: &str| {
        package
            .class(name)
            .and_then(|class| class.primary_constructor())
            .map(|constructor| constructor.visibility)
    };
    assert_eq!(visibility_of("Color"), Some(Visibility::Private));
    assert_eq!(visibility_of("Expr"), Some(Visibility::Protected));
    assert_eq!(visibility_of("Plain"), Some(Visibility::Public));
}

#[test]
fn parameter_properties_are_bound_in_the_trace() {
    let package = package(vec![SourceFile::new("resolver.kt", "app").with_class(
        ClassDeclaration::class("Box").with_primary_constructor(vec![ParameterDeclaration::var(
            "content",
            TypeRef::named("String"),
        )]),
    )]);
    let class = package.class("Box").expect("Box is declared");
    let declaration = &class.declaration().primary_constructor_parameters()[0];
    let trace = DiagnosticTrace::new("resolver.kt");
    let parameter = ValueParameterDescriptor::new(declaration.name, 0, Type::string());
    let property = DefaultDescriptorResolver.resolve_primary_constructor_parameter_to_property(
        &class,
        &parameter,
        &class.scopes().constructor_header(),
        declaration,
        &trace,
    );
    assert!(property.is_var);
    let bound = trace.parameter_property(declaration.id).expect("binding recorded");
    assert!(Rc::ptr_eq(&bound, &property));
}
