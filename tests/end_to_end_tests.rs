//! End-to-end resolution of whole packages through the `lzr` facade.

use lzr::common::diagnostics::diagnostic_codes;
use lzr::resolve::{
    DeclarationNode, FunctionDeclaration, MemberModifiers, NodeId, ParameterDeclaration,
    PropertyDeclaration, TypeRef,
};
use lzr::{
    CancellationToken, ClassDeclaration, LazyMemberScope, LookupLocation, Name, ResolveContext,
    ResolveError, ResolverOptions, SourceFile, compile_package,
};

fn shapes() -> SourceFile {
    SourceFile::new("shapes.kt", "geo")
        .with_class(
            ClassDeclaration::interface("Shape")
                .with_function(FunctionDeclaration::new("area").returning(TypeRef::named("Double")).without_body())
                .with_property(PropertyDeclaration::val("name", TypeRef::named("String"))),
        )
        .with_class(
            ClassDeclaration::class("Circle")
                .data()
                .with_primary_constructor(vec![ParameterDeclaration::val("radius", TypeRef::named("Double"))])
                .with_supertype(TypeRef::named("Shape"))
                .with_function(
                    FunctionDeclaration::new("area")
                        .returning(TypeRef::named("Double"))
                        .with_modifiers(MemberModifiers::OVERRIDE),
                )
                .with_property(
                    PropertyDeclaration::val("name", TypeRef::named("String")).with_modifiers(MemberModifiers::OVERRIDE),
                ),
        )
        .with_class(
            ClassDeclaration::class("Labeled")
                .with_primary_constructor(vec![ParameterDeclaration::new("inner", TypeRef::named("Shape"))])
                .with_delegated_supertype(TypeRef::named("Shape")),
        )
        .with(DeclarationNode::function(FunctionDeclaration::new("main")))
}

fn flawed() -> SourceFile {
    SourceFile::new("flawed.kt", "geo")
        .with_class(ClassDeclaration::class("Broken").with_supertype(TypeRef::named("Polygon")))
        .with_class(
            ClassDeclaration::class("Codec")
                .with_function(
                    FunctionDeclaration::new("encode")
                        .with_parameter(ParameterDeclaration::new("value", TypeRef::named("Int"))),
                )
                .with_function(
                    FunctionDeclaration::new("encode")
                        .with_parameter(ParameterDeclaration::new("value", TypeRef::named("Int").nullable())),
                ),
        )
}

#[test]
fn clean_package_resolves_without_diagnostics() {
    let unit = compile_package(ResolveContext::new("shapes.kt"), "geo", &[shapes()]).expect("resolves");
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    assert_eq!(unit.stats.classes, 3);
    assert!(unit.stats.functions >= 9, "main, area of Shape and Labeled, six Circle members");

    let circle = unit.package.class("Circle").expect("Circle is declared");
    let scope = circle.member_scope();
    let area = scope.contributed_functions(Name::identifier("area"), LookupLocation::NoLocation);
    assert_eq!(area.len(), 1);
    assert!(scope.function_names().contains(&Name::identifier("copy")));
}

#[test]
fn diagnostics_of_a_unit_are_complete_after_forcing() {
    let unit = compile_package(ResolveContext::new("geo"), "geo", &[shapes(), flawed()]).expect("resolves");
    let codes: Vec<u32> = unit.diagnostics.iter().map(|diagnostic| diagnostic.code).collect();
    assert_eq!(
        codes.iter().filter(|&&code| code == diagnostic_codes::UNRESOLVED_REFERENCE).count(),
        1,
        "{codes:?}"
    );
    assert_eq!(
        codes
            .iter()
            .filter(|&&code| code == diagnostic_codes::CONFLICTING_JVM_DECLARATIONS)
            .count(),
        1
    );
    let unresolved = unit
        .diagnostics
        .iter()
        .find(|diagnostic| diagnostic.code == diagnostic_codes::UNRESOLVED_REFERENCE)
        .expect("reported");
    assert_eq!(unresolved.message_text, "Unresolved reference: Polygon");
    assert!(unit.package.context().trace.diagnostics().is_empty(), "diagnostics were drained");
}

#[test]
fn options_loaded_from_json_silence_reports() {
    let options = ResolverOptions::from_json(r#"{ "reportJvmSignatureClashes": false }"#).expect("valid options");
    assert!(options.report_conflicting_overloads);
    let ctx = ResolveContext::new("flawed.kt").with_options(options);
    let unit = compile_package(ctx, "geo", &[flawed()]).expect("resolves");
    let codes: Vec<u32> = unit.diagnostics.iter().map(|diagnostic| diagnostic.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::UNRESOLVED_REFERENCE]);

    assert!(matches!(
        ResolverOptions::from_json(r#"{ "maxHierarchyDepth": 0 }"#),
        Err(ResolveError::InvalidOptions(_))
    ));
}

#[test]
fn cancellation_aborts_the_unit() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = ResolveContext::new("shapes.kt").with_cancellation(token);
    assert!(matches!(
        compile_package(ctx, "geo", &[shapes()]),
        Err(ResolveError::Canceled)
    ));
}

#[test]
fn internal_errors_abort_only_their_unit() {
    let odd = SourceFile::new("odd.kt", "geo").with_class(ClassDeclaration::class("Odd").with_member(
        DeclarationNode::Unsupported {
            node: NodeId(1),
            kind: "script block",
        },
    ));
    assert!(matches!(
        compile_package(ResolveContext::new("odd.kt"), "geo", &[odd]),
        Err(ResolveError::UnsupportedDeclaration { kind: "script block", .. })
    ));

    let unit = compile_package(ResolveContext::new("shapes.kt"), "geo", &[shapes()]);
    assert!(unit.is_ok(), "a later unit is unaffected");
}
