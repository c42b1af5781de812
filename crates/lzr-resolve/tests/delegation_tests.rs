//! Interface implementation by delegation: `class C(d: I) : I by d`.

use lzr_common::Name;
use lzr_resolve::{
    CallableKind, CallableMember, ClassDeclaration, ClassModifiers, DeclarationDescriptor,
    DescriptorKindFilter, FunctionDeclaration, FunctionDescriptor, LazyClassDescriptor,
    LazyMemberScope, LookupLocation, MemberModifiers, Modality, NameFilter, PackageMemberScope,
    ParameterDeclaration, PropertyDeclaration, ResolveContext, SourceFile, TypeRef, Visibility,
};
use std::rc::Rc;

fn n(text: &str) -> Name {
    Name::identifier(text)
}

fn package(classes: Vec<ClassDeclaration>) -> Rc<PackageMemberScope> {
    let mut file = SourceFile::new("delegation.kt", "app");
    for class in classes {
        file = file.with_class(class);
    }
    PackageMemberScope::from_files(Rc::new(ResolveContext::new("delegation.kt")), "app", &[file])
}

fn class(package: &PackageMemberScope, name: &str) -> Rc<LazyClassDescriptor> {
    package.class(name).unwrap_or_else(|| panic!("class {name} is declared"))
}

fn functions(class: &LazyClassDescriptor, name: &str) -> Vec<Rc<FunctionDescriptor>> {
    class
        .member_scope()
        .contributed_functions(n(name), LookupLocation::NoLocation)
}

fn source() -> ClassDeclaration {
    ClassDeclaration::interface("Source")
        .with_function(FunctionDeclaration::new("read").returning(TypeRef::named("Int")).without_body())
        .with_function(FunctionDeclaration::new("close"))
        .with_property(PropertyDeclaration::val("size", TypeRef::named("Int")))
}

fn delegating(name: &str) -> ClassDeclaration {
    ClassDeclaration::class(name)
        .with_primary_constructor(vec![ParameterDeclaration::val("inner", TypeRef::named("Source"))])
        .with_delegated_supertype(TypeRef::named("Source"))
}

#[test]
fn interface_members_are_delegated() {
    let package = package(vec![source(), delegating("Wrapper")]);
    let wrapper = class(&package, "Wrapper");
    let source = class(&package, "Source");
    assert_eq!(wrapper.delegated_supertypes().len(), 1);

    let read = functions(&wrapper, "read");
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].kind(), CallableKind::Delegation);
    assert_eq!(read[0].modality(), Modality::Open);
    assert_eq!(read[0].visibility(), Visibility::Public);
    assert_eq!(read[0].member().owner.fq_name().as_str(), "app.Wrapper");
    assert!(Rc::ptr_eq(&read[0].overridden()[0], &functions(&source, "read")[0]));

    assert_eq!(functions(&wrapper, "close")[0].kind(), CallableKind::Delegation);
    let size = wrapper
        .member_scope()
        .contributed_variables(n("size"), LookupLocation::NoLocation);
    let kinds: Vec<CallableKind> = size.iter().map(|property| property.kind()).collect();
    assert!(kinds.contains(&CallableKind::Delegation));
    assert!(wrapper.context().trace.diagnostics().is_empty());
}

#[test]
fn explicit_overrides_suppress_delegation() {
    let logged = delegating("Logged").with_function(
        FunctionDeclaration::new("read")
            .returning(TypeRef::named("Int"))
            .with_modifiers(MemberModifiers::OVERRIDE),
    );
    let package = package(vec![source(), logged]);
    let logged = class(&package, "Logged");
    let read = functions(&logged, "read");
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].kind(), CallableKind::Declaration);
    assert_eq!(read[0].overridden().len(), 1);
    assert_eq!(functions(&logged, "close")[0].kind(), CallableKind::Delegation);
}

#[test]
fn final_and_private_members_are_not_delegated() {
    let guarded = ClassDeclaration::interface("Guarded")
        .with_function(FunctionDeclaration::new("check").with_modifiers(MemberModifiers::FINAL))
        .with_function(FunctionDeclaration::new("secret").with_visibility(Visibility::Private));
    let holder = ClassDeclaration::class("Holder").with_delegated_supertype(TypeRef::named("Guarded"));
    let package = package(vec![guarded, holder]);
    let holder = class(&package, "Holder");

    let check = functions(&holder, "check");
    assert_eq!(check.len(), 1);
    assert_eq!(check[0].kind(), CallableKind::FakeOverride);
    assert_eq!(check[0].modality(), Modality::Final);
    assert!(functions(&holder, "secret").is_empty());
}

#[test]
fn members_inherited_by_the_interface_are_delegated_too() {
    let closeable = ClassDeclaration::interface("Closeable").with_function(FunctionDeclaration::new("shutdown").without_body());
    let stream = ClassDeclaration::interface("Stream")
        .with_supertype(TypeRef::named("Closeable"))
        .with_function(FunctionDeclaration::new("next").without_body());
    let proxy = ClassDeclaration::class("Proxy").with_delegated_supertype(TypeRef::named("Stream"));
    let package = package(vec![closeable, stream, proxy]);
    let proxy = class(&package, "Proxy");
    assert_eq!(functions(&proxy, "next")[0].kind(), CallableKind::Delegation);
    let shutdown = functions(&proxy, "shutdown");
    assert_eq!(shutdown.len(), 1);
    assert_eq!(shutdown[0].kind(), CallableKind::Delegation);
    assert_eq!(shutdown[0].overridden()[0].kind(), CallableKind::FakeOverride);
}

#[test]
fn class_supertypes_are_never_delegated() {
    let base = ClassDeclaration::class("Base")
        .with_modifiers(ClassModifiers::OPEN)
        .with_function(FunctionDeclaration::new("run").with_modifiers(MemberModifiers::OPEN));
    let odd = ClassDeclaration::class("Odd").with_delegated_supertype(TypeRef::named("Base"));
    let package = package(vec![base, odd]);
    let odd = class(&package, "Odd");
    let run = functions(&odd, "run");
    assert_eq!(run.len(), 1);
    assert_eq!(run[0].kind(), CallableKind::FakeOverride);
}

#[test]
fn delegated_members_are_listed() {
    let package = package(vec![source(), delegating("Wrapper")]);
    let wrapper = class(&package, "Wrapper");
    let listed = wrapper
        .member_scope()
        .contributed_descriptors(DescriptorKindFilter::CALLABLES, &NameFilter::All);
    let delegated: Vec<String> = listed
        .iter()
        .filter_map(|descriptor| match descriptor {
            DeclarationDescriptor::Function(function) if function.kind() == CallableKind::Delegation => {
                Some(function.name().to_string())
            }
            DeclarationDescriptor::Property(property) if property.kind() == CallableKind::Delegation => {
                Some(property.name().to_string())
            }
            _ => None,
        })
        .collect();
    for expected in ["read", "close", "size"] {
        assert!(delegated.iter().any(|name| name == expected), "{expected} is delegated");
    }
}
