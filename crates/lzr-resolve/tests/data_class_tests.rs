//! Members generated for data and value classes.

use lzr_common::Name;
use lzr_resolve::{
    CallableKind, CallableMember, ClassDeclaration, ClassModifiers, ConstructorDeclaration,
    DeclarationDescriptor, DescriptorKindFilter, FunctionDeclaration, FunctionDescriptor,
    LazyClassDescriptor, LazyMemberScope, LookupLocation, MemberModifiers, Modality, NameFilter,
    PackageMemberScope, ParameterDeclaration, ResolveContext, ResolveError, ResolverOptions,
    SourceFile, Type, TypeRef, Visibility, run_guarded,
};
use std::rc::Rc;

fn n(text: &str) -> Name {
    Name::identifier(text)
}

fn user() -> ClassDeclaration {
    ClassDeclaration::class("User").data().with_primary_constructor(vec![
        ParameterDeclaration::val("name", TypeRef::named("String")),
        ParameterDeclaration::var("age", TypeRef::named("Int")),
        ParameterDeclaration::new("nickname", TypeRef::named("String").nullable()).with_default(),
    ])
}

/// The package is returned too: classes only live as long as it does.
fn resolve_with(
    options: ResolverOptions,
    classes: Vec<ClassDeclaration>,
    name: &str,
) -> (Rc<PackageMemberScope>, Rc<LazyClassDescriptor>) {
    let mut file = SourceFile::new("data.kt", "app");
    for class in classes {
        file = file.with_class(class);
    }
    let ctx = ResolveContext::new("data.kt").with_options(options);
    let package = PackageMemberScope::from_files(Rc::new(ctx), "app", &[file]);
    let class = package.class(name).unwrap_or_else(|| panic!("{name} is declared"));
    (package, class)
}

fn resolve(classes: Vec<ClassDeclaration>, name: &str) -> (Rc<PackageMemberScope>, Rc<LazyClassDescriptor>) {
    resolve_with(ResolverOptions::strict(), classes, name)
}

fn functions(class: &LazyClassDescriptor, name: &str) -> Vec<Rc<FunctionDescriptor>> {
    class
        .member_scope()
        .contributed_functions(n(name), LookupLocation::NoLocation)
}

#[test]
fn components_follow_property_parameters() {
    let (_package, user) = resolve(vec![user()], "User");
    let first = functions(&user, "component1");
    let second = functions(&user, "component2");
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].return_type, Type::string());
    assert_eq!(second[0].return_type, Type::int());
    assert!(first[0].is_operator);
    assert_eq!(first[0].kind(), CallableKind::Synthesized);
    assert_eq!(first[0].modality(), Modality::Final);
    assert!(functions(&user, "component3").is_empty(), "plain parameters declare no component");
    assert!(functions(&user, "component0").is_empty());
}

#[test]
fn two_property_data_class() {
    let point = ClassDeclaration::class("P").data().with_primary_constructor(vec![
        ParameterDeclaration::val("x", TypeRef::named("Int")),
        ParameterDeclaration::val("y", TypeRef::named("Int")),
    ]);
    let (_package, point) = resolve(vec![point], "P");
    assert_eq!(functions(&point, "component1").len(), 1);
    assert_eq!(functions(&point, "component2").len(), 1);
    assert!(functions(&point, "component3").is_empty());
    let copy = functions(&point, "copy");
    assert_eq!(copy.len(), 1);
    assert_eq!(copy[0].value_parameters.len(), 2);
    assert!(copy[0].value_parameters.iter().all(|parameter| parameter.declares_default_value));
}

#[test]
fn classes_do_not_outlive_their_package() {
    let (package, user) = resolve(vec![user()], "User");
    drop(package);
    let result = run_guarded(|| functions(&user, "component1").len());
    assert!(matches!(result, Err(ResolveError::ScopeInvalidated(_))), "{result:?}");
}

#[test]
fn copy_takes_every_constructor_parameter() {
    let (_package, user) = resolve(vec![user()], "User");
    let copy = functions(&user, "copy");
    assert_eq!(copy.len(), 1);
    let copy = &copy[0];
    assert_eq!(copy.return_type, user.default_type());
    assert_eq!(copy.visibility(), Visibility::Public);

    let names: Vec<String> = copy.value_parameters.iter().map(|p| p.name.to_string()).collect();
    assert_eq!(names, vec!["name", "age", "nickname"]);
    assert!(copy.value_parameters.iter().all(|parameter| parameter.declares_default_value));

    let name_property = user
        .member_scope()
        .contributed_variables(n("name"), LookupLocation::NoLocation);
    let default = copy.value_parameters[0]
        .default_from_property
        .as_ref()
        .expect("name defaults to its property");
    assert!(Rc::ptr_eq(default, &name_property[0]));
    assert!(copy.value_parameters[2].default_from_property.is_none());
}

#[test]
fn data_classes_get_functions_from_any() {
    let (_package, user) = resolve(vec![user()], "User");
    let equals = functions(&user, "equals");
    assert_eq!(equals.len(), 1);
    assert!(equals[0].is_operator);
    assert_eq!(equals[0].return_type, Type::boolean());
    assert_eq!(equals[0].value_parameters[0].ty, Type::nullable_any());
    assert_eq!(functions(&user, "hashCode")[0].return_type, Type::int());
    assert_eq!(functions(&user, "toString")[0].return_type, Type::string());

    let names = user.member_scope().function_names();
    for expected in ["component1", "component2", "copy", "equals", "hashCode", "toString"] {
        assert!(names.contains(&n(expected)), "{expected} is a function name");
    }
    assert!(!names.contains(&n("component3")));
}

#[test]
fn declared_members_are_not_duplicated() {
    let point = ClassDeclaration::class("Point")
        .data()
        .with_primary_constructor(vec![ParameterDeclaration::val("x", TypeRef::named("Int"))])
        .with_function(
            FunctionDeclaration::new("toString")
                .with_modifiers(MemberModifiers::OVERRIDE)
                .returning(TypeRef::named("String")),
        );
    let (_package, point) = resolve(vec![point], "Point");
    let to_string = functions(&point, "toString");
    assert_eq!(to_string.len(), 1);
    assert_eq!(to_string[0].kind(), CallableKind::Declaration);
}

#[test]
fn final_supertype_members_are_not_synthesized() {
    let base = ClassDeclaration::class("Base")
        .with_modifiers(ClassModifiers::OPEN)
        .with_function(
            FunctionDeclaration::new("toString")
                .with_modifiers(MemberModifiers::OVERRIDE | MemberModifiers::FINAL)
                .returning(TypeRef::named("String")),
        );
    let derived = ClassDeclaration::class("Derived")
        .data()
        .with_primary_constructor(vec![ParameterDeclaration::val("id", TypeRef::named("Int"))])
        .with_supertype(TypeRef::named("Base"));
    let (_package, derived) = resolve(vec![base, derived], "Derived");

    let to_string = functions(&derived, "toString");
    assert_eq!(to_string.len(), 1);
    assert_eq!(to_string[0].kind(), CallableKind::FakeOverride);
    assert_eq!(to_string[0].modality(), Modality::Final);
    assert_eq!(functions(&derived, "equals")[0].kind(), CallableKind::Synthesized);
}

#[test]
fn language_features_shape_generated_members() {
    let mut options = ResolverOptions::strict();
    options.language_features.data_class_inheritance = false;
    options.language_features.copy_respects_constructor_visibility = true;
    let token = ClassDeclaration::class("Token").data().with_primary_constructor_declaration(
        ConstructorDeclaration::new(vec![ParameterDeclaration::val("value", TypeRef::named("String"))])
            .with_visibility(Visibility::Private),
    );
    let (_package, token) = resolve_with(options, vec![token], "Token");

    assert_eq!(functions(&token, "copy")[0].visibility(), Visibility::Private);
    assert!(functions(&token, "equals").is_empty());
    assert!(!token.member_scope().function_names().contains(&n("equals")));
    assert_eq!(functions(&token, "component1").len(), 1);
}

#[test]
fn value_classes_get_only_functions_from_any() {
    let meters = ClassDeclaration::class("Meters")
        .with_modifiers(ClassModifiers::VALUE)
        .with_primary_constructor(vec![ParameterDeclaration::val("amount", TypeRef::named("Double"))]);
    let (_package, meters) = resolve(vec![meters], "Meters");
    assert!(meters.is_value());
    assert_eq!(functions(&meters, "hashCode").len(), 1);
    assert!(functions(&meters, "component1").is_empty());
    assert!(functions(&meters, "copy").is_empty());
}

#[test]
fn listing_contains_generated_members() {
    let (_package, user) = resolve(vec![user()], "User");
    let listed = user
        .member_scope()
        .contributed_descriptors(DescriptorKindFilter::FUNCTIONS, &NameFilter::All);
    let names: Vec<String> = listed.iter().map(|descriptor| descriptor.name().to_string()).collect();
    for expected in ["component1", "component2", "copy", "equals", "hashCode", "toString"] {
        assert!(names.iter().any(|name| name == expected), "{expected} is listed");
    }
    assert!(listed.iter().all(|descriptor| matches!(descriptor, DeclarationDescriptor::Function(_))));

    let variables = user
        .member_scope()
        .contributed_descriptors(DescriptorKindFilter::VARIABLES, &NameFilter::All);
    let names: Vec<String> = variables.iter().map(|descriptor| descriptor.name().to_string()).collect();
    assert_eq!(names, vec!["name", "age"]);
}
