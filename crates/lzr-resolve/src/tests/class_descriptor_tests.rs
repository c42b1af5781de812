use super::*;
use crate::declarations::{SourceFile, TypeRef};
use crate::synthetic::SyntheticResolveExtension;
use lzr_common::Span;

fn package_with(ctx: ResolveContext, classes: Vec<ClassDeclaration>) -> Rc<PackageMemberScope> {
    let mut file = SourceFile::new("c.kt", "app");
    for class in classes {
        file = file.with_class(class);
    }
    PackageMemberScope::from_files(Rc::new(ctx), "app", &[file])
}

fn package(classes: Vec<ClassDeclaration>) -> Rc<PackageMemberScope> {
    package_with(ResolveContext::new("c.kt"), classes)
}

fn fq_names(classes: &[Rc<LazyClassDescriptor>]) -> Vec<String> {
    classes.iter().map(|class| class.fq_name().to_string()).collect()
}

#[test]
fn creating_a_descriptor_resolves_nothing() {
    let package = package(vec![ClassDeclaration::class("A").with_supertype(TypeRef::named("Missing"))]);
    let class = package.class("A").expect("A is declared");
    assert_eq!(class.fq_name().as_str(), "app.A");
    assert!(!class.are_supertypes_resolved());
    assert!(class.scopes().computed_scopes().is_empty());
    assert!(class.context().trace.diagnostics().is_empty());
}

#[test]
fn superclass_chain_skips_interfaces() {
    let package = package(vec![
        ClassDeclaration::class("C").with_supertype(TypeRef::named("B")).with_supertype(TypeRef::named("I")),
        ClassDeclaration::class("B").with_supertype(TypeRef::named("A")),
        ClassDeclaration::class("A"),
        ClassDeclaration::interface("I"),
    ]);
    let c = package.class("C").expect("C is declared");
    assert_eq!(c.supertypes().len(), 2);
    assert_eq!(c.superclass_not_any().map(|class| class.fq_name().to_string()), Some("app.B".to_string()));
    assert_eq!(fq_names(&c.all_superclasses_without_any()), vec!["app.B", "app.A"]);
    assert!(c.are_supertypes_resolved());
}

#[test]
fn inheritance_cycles_are_broken_and_reported_once() {
    let package = package(vec![
        ClassDeclaration::class("A").with_supertype(TypeRef::named("B")).at(Span::new(10, 5)),
        ClassDeclaration::class("B").with_supertype(TypeRef::named("A")).at(Span::new(30, 5)),
    ]);
    let a = package.class("A").expect("A is declared");
    let b = package.class("B").expect("B is declared");
    assert!(a.supertypes().is_empty());
    assert_eq!(b.supertypes().len(), 1);
    assert!(b.all_superclasses_without_any().iter().all(|class| !Rc::ptr_eq(class, &b)));

    let trace = &a.context().trace;
    assert_eq!(trace.count_of(diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY), 1);
    let diagnostic = &trace.diagnostics()[0];
    assert_eq!(diagnostic.start, 10);
    assert!(diagnostic.message_text.contains("app.A"));
}

#[test]
fn self_inheritance_is_a_cycle() {
    let package = package(vec![ClassDeclaration::class("Loop").with_supertype(TypeRef::named("Loop"))]);
    let class = package.class("Loop").expect("Loop is declared");
    assert!(class.supertypes().is_empty());
    assert_eq!(class.context().trace.count_of(diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY), 1);
}

#[test]
fn declared_companion_is_found() {
    let package = package(vec![
        ClassDeclaration::class("Config").with_nested(ClassDeclaration::companion()),
    ]);
    let class = package.class("Config").expect("Config is declared");
    let companion = class.companion_object().expect("companion declared");
    assert_eq!(companion.fq_name().as_str(), "app.Config.Companion");
    assert!(!companion.is_synthetic());
    assert!(Rc::ptr_eq(&companion.containing_class().expect("nested"), &class));
    assert!(Rc::ptr_eq(&companion, &class.companion_object().expect("memoized")));
}

struct NamedCompanion;

impl SyntheticResolveExtension for NamedCompanion {
    fn synthetic_companion_object_name(&self, class: &LazyClassDescriptor) -> Option<Name> {
        (class.name() == Name::identifier("Model")).then(|| Name::identifier("Factory"))
    }
}

#[test]
fn plugins_can_request_a_companion() {
    let ctx = ResolveContext::new("c.kt").with_synthetic(Rc::new(NamedCompanion));
    let package = package_with(ctx, vec![ClassDeclaration::class("Model").at(Span::new(5, 20))]);
    let class = package.class("Model").expect("Model is declared");
    let companion = class.companion_object().expect("synthetic companion");
    assert!(companion.is_synthetic());
    assert!(companion.is_companion_object());
    assert_eq!(companion.fq_name().as_str(), "app.Model.Factory");
    assert_eq!(companion.declaration().span, Span::new(5, 20));
}

#[test]
fn default_type_points_back_at_the_class() {
    let package = package(vec![ClassDeclaration::class("A")]);
    let class = package.class("A").expect("A is declared");
    let ty = class.default_type();
    assert_eq!(ty.to_string(), "app.A");
    assert!(Rc::ptr_eq(&ty.class_descriptor().expect("declared class"), &class));
    assert_eq!(format!("{class:?}"), "lazy class app.A");
}

#[test]
fn member_scope_view_is_memoized_and_distinct() {
    let package = package(vec![ClassDeclaration::class("A")]);
    let class = package.class("A").expect("A is declared");
    let view = class.member_scope_view();
    assert!(view.is_view());
    assert!(!class.member_scope().is_view());
    assert!(Rc::ptr_eq(&view, &class.member_scope_view()));
    assert!(!Rc::ptr_eq(&view, &class.member_scope()));
}
