use super::*;

fn function(name: &str, visibility: Visibility, parameters: Vec<Type>) -> Rc<FunctionDescriptor> {
    let member = MemberData::new(
        Name::identifier(name),
        DescriptorOwner::Package(FqName::new("pkg")),
        CallableKind::Declaration,
        Modality::Final,
        visibility,
    );
    let parameters = parameters
        .into_iter()
        .enumerate()
        .map(|(index, ty)| ValueParameterDescriptor::new(Name::identifier(&format!("p{index}")), index, ty))
        .collect();
    Rc::new(FunctionDescriptor::new(member, None, parameters, Type::unit()))
}

#[test]
fn visibility_order_is_partial() {
    assert_eq!(Visibility::Public.compare(Visibility::Private), Some(Ordering::Greater));
    assert_eq!(Visibility::Private.compare(Visibility::Protected), Some(Ordering::Less));
    assert_eq!(Visibility::Protected.compare(Visibility::Internal), None);
    assert_eq!(Visibility::Unknown.compare(Visibility::Unknown), None);
    assert_eq!(Visibility::Unknown.compare(Visibility::Public), None);
    assert_eq!(Visibility::Internal.compare(Visibility::Internal), Some(Ordering::Equal));
}

#[test]
fn max_visibility_needs_a_dominating_element() {
    assert_eq!(find_max_visibility(&[]), Some(Visibility::Public));
    assert_eq!(
        find_max_visibility(&[Visibility::Private, Visibility::Protected]),
        Some(Visibility::Protected)
    );
    assert_eq!(
        find_max_visibility(&[Visibility::Protected, Visibility::Internal]),
        None
    );
    assert_eq!(
        find_max_visibility(&[Visibility::Protected, Visibility::Internal, Visibility::Public]),
        Some(Visibility::Public)
    );
}

#[test]
fn describe_renders_owner_parameters_and_type() {
    let f = function("f", Visibility::Public, vec![Type::int(), Type::string().with_nullability(true)]);
    assert_eq!(f.describe(), "fun pkg.f(Int, String?): Unit");
}

#[test]
fn jvm_signature_ignores_nullability_and_return_type() {
    let a = function("f", Visibility::Public, vec![Type::int()]);
    let b = function("f", Visibility::Public, vec![Type::int().with_nullability(true)]);
    assert_ne!(a.signature(), b.signature());
    assert_eq!(a.jvm_signature(), b.jvm_signature());
    assert_eq!(a.jvm_signature(), "f(Int)");
}

#[test]
fn property_jvm_signature_is_its_getter() {
    let member = MemberData::new(
        Name::identifier("size"),
        DescriptorOwner::Package(FqName::new("pkg")),
        CallableKind::Declaration,
        Modality::Final,
        Visibility::Public,
    );
    let property = PropertyDescriptor::new(member, None, Type::int(), false);
    assert_eq!(property.jvm_signature(), "getSize()");
}

#[test]
fn add_overridden_ignores_duplicates() {
    let base = function("f", Visibility::Public, vec![]);
    let sub = function("f", Visibility::Public, vec![]);
    sub.add_overridden(Rc::clone(&base));
    sub.add_overridden(Rc::clone(&base));
    assert_eq!(sub.overridden().len(), 1);
}

#[test]
fn derived_member_drops_source_unless_kept() {
    let source = SourceElement {
        node: NodeId(3),
        span: Span::new(10, 4),
    };
    let data = MemberData::new(
        Name::identifier("f"),
        DescriptorOwner::Package(FqName::new("pkg")),
        CallableKind::Declaration,
        Modality::Open,
        Visibility::Internal,
    )
    .with_source(Some(source));
    let owner = DescriptorOwner::Package(FqName::new("other"));
    let fake = data.derived(owner.clone(), CallableKind::FakeOverride, Modality::Open, Visibility::Unknown, false);
    assert_eq!(fake.source, None);
    assert_eq!(fake.visibility(), Visibility::Unknown);
    let copy = data.derived(owner, CallableKind::Declaration, Modality::Open, Visibility::Internal, true);
    assert_eq!(copy.source, Some(source));
    assert_eq!(copy.owner.fq_name().as_str(), "other");
}

#[test]
fn declaration_descriptors_compare_by_identity() {
    let f = function("f", Visibility::Public, vec![]);
    let same = DeclarationDescriptor::Function(Rc::clone(&f));
    let twin = DeclarationDescriptor::Function(function("f", Visibility::Public, vec![]));
    assert_eq!(DeclarationDescriptor::Function(f), same);
    assert_ne!(same, twin);
}

#[test]
fn constructor_return_type_is_deferred() {
    let constructor = ConstructorDescriptor::new(
        DescriptorOwner::Package(FqName::new("pkg")),
        true,
        Visibility::Public,
        Vec::new(),
    );
    assert!(!constructor.has_return_type());
    assert!(constructor.return_type().is_error());
    constructor.set_deferred_return_type(LazyValue::new(Type::string));
    assert!(constructor.has_return_type());
    assert!(!constructor.is_return_type_computed());
    assert_eq!(constructor.return_type(), Type::string());
    assert!(constructor.is_return_type_computed());
}
