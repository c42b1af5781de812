use super::*;
use crate::declarations::{DestructuringDeclaration, NodeId, TypeRef};

fn name(text: &str) -> Name {
    Name::identifier(text)
}

fn sample_class() -> Rc<ClassDeclaration> {
    Rc::new(
        ClassDeclaration::class("Point")
            .with_primary_constructor(vec![
                ParameterDeclaration::val("x", TypeRef::named("Int")),
                ParameterDeclaration::new("scale", TypeRef::named("Int")),
            ])
            .with_function(FunctionDeclaration::new("plus"))
            .with_function(FunctionDeclaration::new("plus").returning(TypeRef::named("Point")))
            .with_property(PropertyDeclaration::val("norm", TypeRef::named("Double")))
            .with_nested(ClassDeclaration::object("Origin"))
            .with_member(DeclarationNode::AnonymousInitializer(NodeId::next())),
    )
}

#[test]
fn class_provider_indexes_members_by_name() {
    let provider = ClassDeclarationProvider::new(sample_class());
    assert_eq!(provider.function_declarations(name("plus")).len(), 2);
    assert_eq!(provider.property_declarations(name("norm")).len(), 1);
    assert_eq!(provider.class_or_object_declarations(name("Origin")).len(), 1);
    assert!(provider.function_declarations(name("minus")).is_empty());
}

#[test]
fn only_val_var_parameters_are_members() {
    let provider = ClassDeclarationProvider::new(sample_class());
    let names = provider.declaration_names();
    assert!(names.contains(&name("x")));
    assert!(!names.contains(&name("scale")));
    assert_eq!(provider.primary_constructor_parameters().len(), 2);
}

#[test]
fn declaration_names_are_deduplicated_in_order() {
    let provider = ClassDeclarationProvider::new(sample_class());
    assert_eq!(
        provider.declaration_names(),
        vec![name("x"), name("plus"), name("norm"), name("Origin")]
    );
}

#[test]
fn declarations_respect_kind_and_name_filters() {
    let provider = ClassDeclarationProvider::new(sample_class());
    let functions = provider.declarations(DescriptorKindFilter::FUNCTIONS, &NameFilter::All);
    // Two `plus` overloads plus the initializer, which is always handed out.
    assert_eq!(functions.len(), 3);

    let only_norm = |candidate: Name| candidate == name("norm");
    let filtered = provider.declarations(DescriptorKindFilter::ALL, &NameFilter::Matching(&only_norm));
    let named: Vec<Option<Name>> = filtered.iter().map(DeclarationNode::name).collect();
    assert_eq!(named, vec![Some(name("norm")), None]);
}

#[test]
fn file_provider_takes_only_its_package() {
    let files = vec![
        SourceFile::new("a.kt", "app")
            .with_class(ClassDeclaration::class("A"))
            .with(DeclarationNode::destructuring(DestructuringDeclaration::new(&["left", "right"]))),
        SourceFile::new("b.kt", "lib").with_class(ClassDeclaration::class("B")),
        SourceFile::new("c.kt", "app").with(DeclarationNode::function(FunctionDeclaration::new("main"))),
    ];
    let provider = FileDeclarationProvider::new(FqName::new("app"), &files);
    assert_eq!(provider.package().as_str(), "app");
    assert_eq!(
        provider.declaration_names(),
        vec![name("A"), name("left"), name("right"), name("main")]
    );
    assert!(provider.class_or_object_declarations(name("B")).is_empty());
    assert_eq!(provider.destructuring_entries(name("right")).len(), 1);
    assert!(provider.property_declarations(name("right")).is_empty());
}
