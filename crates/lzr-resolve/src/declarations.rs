//! Syntax-side declaration nodes.
//!
//! These are what a parser hands to the resolution engine: plain, immutable
//! trees with node ids and spans, no semantic information. Nodes are shared
//! through `Rc` so providers can index them by name without copying, and
//! descriptors can point back at their source.
//!
//! The constructors and `with_*` methods double as builders for tests and
//! embedders that synthesize declarations in memory.

use crate::descriptors::Visibility;
use bitflags::bitflags;
use lzr_common::{Name, Span};
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a declaration node, unique within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn next() -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An unresolved type reference as written in source, e.g. `Int?`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub name: Name,
    pub nullable: bool,
    pub span: Span,
}

impl TypeRef {
    pub fn named(name: &str) -> TypeRef {
        TypeRef {
            name: Name::identifier(name),
            nullable: false,
            span: Span::SYNTHETIC,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> TypeRef {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> TypeRef {
        self.span = span;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Object,
    EnumClass,
    EnumEntry,
    AnnotationClass,
}

impl ClassKind {
    pub fn is_singleton(self) -> bool {
        matches!(self, ClassKind::Object | ClassKind::EnumEntry)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ClassModifiers: u16 {
        const DATA      = 1 << 0;
        const VALUE     = 1 << 1;
        const EXPECT    = 1 << 2;
        const INNER     = 1 << 3;
        const COMPANION = 1 << 4;
        const ABSTRACT  = 1 << 5;
        const OPEN      = 1 << 6;
        const SEALED    = 1 << 7;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MemberModifiers: u16 {
        const OVERRIDE = 1 << 0;
        const ABSTRACT = 1 << 1;
        const OPEN     = 1 << 2;
        const FINAL    = 1 << 3;
        const OPERATOR = 1 << 4;
        const EXPECT   = 1 << 5;
    }
}

// =============================================================================
// Callable declarations
// =============================================================================

/// A value parameter of a function or constructor.
///
/// `val`/`var` parameters of a primary constructor also declare a property.
#[derive(Clone, Debug)]
pub struct ParameterDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: Name,
    pub ty: TypeRef,
    pub val_or_var: Option<ValOrVar>,
    pub visibility: Option<Visibility>,
    pub modifiers: MemberModifiers,
    pub has_default: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValOrVar {
    Val,
    Var,
}

impl ParameterDeclaration {
    /// A plain parameter (no property).
    pub fn new(name: &str, ty: TypeRef) -> ParameterDeclaration {
        ParameterDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            name: Name::identifier(name),
            ty,
            val_or_var: None,
            visibility: None,
            modifiers: MemberModifiers::empty(),
            has_default: false,
        }
    }

    pub fn val(name: &str, ty: TypeRef) -> ParameterDeclaration {
        ParameterDeclaration {
            val_or_var: Some(ValOrVar::Val),
            ..Self::new(name, ty)
        }
    }

    pub fn var(name: &str, ty: TypeRef) -> ParameterDeclaration {
        ParameterDeclaration {
            val_or_var: Some(ValOrVar::Var),
            ..Self::new(name, ty)
        }
    }

    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn has_val_or_var(&self) -> bool {
        self.val_or_var.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: Name,
    pub visibility: Option<Visibility>,
    pub modifiers: MemberModifiers,
    pub receiver: Option<TypeRef>,
    pub type_parameters: Vec<Name>,
    pub parameters: Vec<ParameterDeclaration>,
    /// `None` means `Unit` for block bodies.
    pub return_type: Option<TypeRef>,
    pub has_body: bool,
}

impl FunctionDeclaration {
    pub fn new(name: &str) -> FunctionDeclaration {
        FunctionDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            name: Name::identifier(name),
            visibility: None,
            modifiers: MemberModifiers::empty(),
            receiver: None,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            has_body: true,
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDeclaration) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_type_parameter(mut self, name: &str) -> Self {
        self.type_parameters.push(Name::identifier(name));
        self
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: TypeRef) -> Self {
        self.receiver = Some(receiver);
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Abstract member: no body.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.has_body = false;
        self
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Clone, Debug)]
pub struct PropertyDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: Name,
    pub visibility: Option<Visibility>,
    pub modifiers: MemberModifiers,
    pub receiver: Option<TypeRef>,
    /// `None` when the type is left to inference.
    pub ty: Option<TypeRef>,
    pub is_var: bool,
}

impl PropertyDeclaration {
    pub fn val(name: &str, ty: TypeRef) -> PropertyDeclaration {
        PropertyDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            name: Name::identifier(name),
            visibility: None,
            modifiers: MemberModifiers::empty(),
            receiver: None,
            ty: Some(ty),
            is_var: false,
        }
    }

    pub fn var(name: &str, ty: TypeRef) -> PropertyDeclaration {
        PropertyDeclaration {
            is_var: true,
            ..Self::val(name, ty)
        }
    }

    /// A property without an explicit type.
    pub fn inferred(name: &str) -> PropertyDeclaration {
        PropertyDeclaration {
            ty: None,
            ..Self::val(name, TypeRef::named("Any"))
        }
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: TypeRef) -> Self {
        self.receiver = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ConstructorDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub visibility: Option<Visibility>,
    pub parameters: Vec<ParameterDeclaration>,
}

impl ConstructorDeclaration {
    pub fn new(parameters: Vec<ParameterDeclaration>) -> ConstructorDeclaration {
        ConstructorDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            visibility: None,
            parameters,
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

#[derive(Clone, Debug)]
pub struct TypeAliasDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: Name,
    pub visibility: Option<Visibility>,
    pub is_expect: bool,
    pub target: TypeRef,
}

impl TypeAliasDeclaration {
    pub fn new(name: &str, target: TypeRef) -> TypeAliasDeclaration {
        TypeAliasDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            name: Name::identifier(name),
            visibility: None,
            is_expect: false,
            target,
        }
    }

    #[must_use]
    pub fn expect(mut self) -> Self {
        self.is_expect = true;
        self
    }
}

/// `val (a, b) = ...` at container level; each entry declares a property.
#[derive(Clone, Debug)]
pub struct DestructuringDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub entries: Vec<Rc<PropertyDeclaration>>,
}

impl DestructuringDeclaration {
    pub fn new(names: &[&str]) -> DestructuringDeclaration {
        DestructuringDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            entries: names
                .iter()
                .map(|name| Rc::new(PropertyDeclaration::inferred(name)))
                .collect(),
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

/// One entry of a supertype list. `by_delegation` marks `I by expr`.
#[derive(Clone, Debug)]
pub struct SupertypeEntry {
    pub ty: TypeRef,
    pub by_delegation: bool,
}

#[derive(Clone, Debug)]
pub struct ClassDeclaration {
    pub id: NodeId,
    pub span: Span,
    pub name: Name,
    pub kind: ClassKind,
    pub modifiers: ClassModifiers,
    pub visibility: Option<Visibility>,
    pub type_parameters: Vec<Name>,
    pub supertypes: Vec<SupertypeEntry>,
    /// Explicit primary constructor, `class C(...)`.
    pub primary_constructor: Option<ConstructorDeclaration>,
    pub secondary_constructors: Vec<ConstructorDeclaration>,
    pub members: Vec<DeclarationNode>,
}

impl ClassDeclaration {
    pub fn new(name: &str, kind: ClassKind) -> ClassDeclaration {
        ClassDeclaration {
            id: NodeId::next(),
            span: Span::SYNTHETIC,
            name: Name::identifier(name),
            kind,
            modifiers: ClassModifiers::empty(),
            visibility: None,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            primary_constructor: None,
            secondary_constructors: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn class(name: &str) -> ClassDeclaration {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: &str) -> ClassDeclaration {
        Self::new(name, ClassKind::Interface)
    }

    pub fn object(name: &str) -> ClassDeclaration {
        Self::new(name, ClassKind::Object)
    }

    /// `companion object` with the conventional name.
    pub fn companion() -> ClassDeclaration {
        Self::object("Companion").with_modifiers(ClassModifiers::COMPANION)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ClassModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn data(self) -> Self {
        self.with_modifiers(ClassModifiers::DATA)
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn with_type_parameter(mut self, name: &str) -> Self {
        self.type_parameters.push(Name::identifier(name));
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, ty: TypeRef) -> Self {
        self.supertypes.push(SupertypeEntry {
            ty,
            by_delegation: false,
        });
        self
    }

    #[must_use]
    pub fn with_delegated_supertype(mut self, ty: TypeRef) -> Self {
        self.supertypes.push(SupertypeEntry {
            ty,
            by_delegation: true,
        });
        self
    }

    #[must_use]
    pub fn with_primary_constructor(mut self, parameters: Vec<ParameterDeclaration>) -> Self {
        self.primary_constructor = Some(ConstructorDeclaration::new(parameters));
        self
    }

    #[must_use]
    pub fn with_primary_constructor_declaration(mut self, ctor: ConstructorDeclaration) -> Self {
        self.primary_constructor = Some(ctor);
        self
    }

    #[must_use]
    pub fn with_secondary_constructor(mut self, ctor: ConstructorDeclaration) -> Self {
        self.secondary_constructors.push(ctor);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: DeclarationNode) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn with_function(self, function: FunctionDeclaration) -> Self {
        self.with_member(DeclarationNode::Function(Rc::new(function)))
    }

    #[must_use]
    pub fn with_property(self, property: PropertyDeclaration) -> Self {
        self.with_member(DeclarationNode::Property(Rc::new(property)))
    }

    #[must_use]
    pub fn with_nested(self, class: ClassDeclaration) -> Self {
        self.with_member(DeclarationNode::Class(Rc::new(class)))
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_data(&self) -> bool {
        self.modifiers.contains(ClassModifiers::DATA)
    }

    pub fn is_expect(&self) -> bool {
        self.modifiers.contains(ClassModifiers::EXPECT)
    }

    pub fn is_companion(&self) -> bool {
        self.modifiers.contains(ClassModifiers::COMPANION)
    }

    pub fn has_explicit_primary_constructor(&self) -> bool {
        self.primary_constructor.is_some()
    }

    /// Parameters of the explicit primary constructor, empty when there is none.
    pub fn primary_constructor_parameters(&self) -> &[ParameterDeclaration] {
        self.primary_constructor
            .as_ref()
            .map_or(&[], |ctor| ctor.parameters.as_slice())
    }

    pub fn companion_declaration(&self) -> Option<&Rc<ClassDeclaration>> {
        self.members.iter().find_map(|member| match member {
            DeclarationNode::Class(class) if class.is_companion() => Some(class),
            _ => None,
        })
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A declaration as a container lists it.
#[derive(Clone, Debug)]
pub enum DeclarationNode {
    Class(Rc<ClassDeclaration>),
    Function(Rc<FunctionDeclaration>),
    Property(Rc<PropertyDeclaration>),
    /// Primary-constructor parameter viewed as a container member.
    Parameter(Rc<ParameterDeclaration>),
    TypeAlias(Rc<TypeAliasDeclaration>),
    Destructuring(Rc<DestructuringDeclaration>),
    /// `init { ... }` blocks: members of the container, but they declare nothing.
    AnonymousInitializer(NodeId),
    /// Anything a provider should never have handed to a member scope.
    Unsupported { node: NodeId, kind: &'static str },
}

impl DeclarationNode {
    pub fn function(function: FunctionDeclaration) -> Self {
        DeclarationNode::Function(Rc::new(function))
    }

    pub fn property(property: PropertyDeclaration) -> Self {
        DeclarationNode::Property(Rc::new(property))
    }

    pub fn class(class: ClassDeclaration) -> Self {
        DeclarationNode::Class(Rc::new(class))
    }

    pub fn type_alias(alias: TypeAliasDeclaration) -> Self {
        DeclarationNode::TypeAlias(Rc::new(alias))
    }

    pub fn destructuring(declaration: DestructuringDeclaration) -> Self {
        DeclarationNode::Destructuring(Rc::new(declaration))
    }

    pub fn id(&self) -> NodeId {
        match self {
            DeclarationNode::Class(class) => class.id,
            DeclarationNode::Function(function) => function.id,
            DeclarationNode::Property(property) => property.id,
            DeclarationNode::Parameter(parameter) => parameter.id,
            DeclarationNode::TypeAlias(alias) => alias.id,
            DeclarationNode::Destructuring(destructuring) => destructuring.id,
            DeclarationNode::AnonymousInitializer(id) => *id,
            DeclarationNode::Unsupported { node, .. } => *node,
        }
    }

    /// Simple name, if the node declares exactly one.
    pub fn name(&self) -> Option<Name> {
        match self {
            DeclarationNode::Class(class) => Some(class.name),
            DeclarationNode::Function(function) => Some(function.name),
            DeclarationNode::Property(property) => Some(property.name),
            DeclarationNode::Parameter(parameter) => Some(parameter.name),
            DeclarationNode::TypeAlias(alias) => Some(alias.name),
            DeclarationNode::Destructuring(_)
            | DeclarationNode::AnonymousInitializer(_)
            | DeclarationNode::Unsupported { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclarationNode::Class(_) => "class",
            DeclarationNode::Function(_) => "function",
            DeclarationNode::Property(_) => "property",
            DeclarationNode::Parameter(_) => "parameter",
            DeclarationNode::TypeAlias(_) => "typealias",
            DeclarationNode::Destructuring(_) => "destructuring declaration",
            DeclarationNode::AnonymousInitializer(_) => "anonymous initializer",
            DeclarationNode::Unsupported { kind, .. } => kind,
        }
    }
}

/// Top-level declarations of one package fragment.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub name: String,
    pub package: crate::types::FqName,
    pub declarations: Vec<DeclarationNode>,
}

impl SourceFile {
    pub fn new(name: &str, package: &str) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            package: crate::types::FqName::new(package),
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, declaration: DeclarationNode) -> Self {
        self.declarations.push(declaration);
        self
    }

    #[must_use]
    pub fn with_class(self, class: ClassDeclaration) -> Self {
        self.with(DeclarationNode::class(class))
    }
}
