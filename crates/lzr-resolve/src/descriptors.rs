//! Resolved declarations.
//!
//! A descriptor is the semantic view of a declaration: name, owner, kind,
//! modality, visibility and resolved types. Descriptors are handed out as
//! `Rc`s and compared by identity; member scopes cache them for their own
//! lifetime, so asking twice yields the same allocation.
//!
//! Descriptors are immutable once published, with two exceptions that happen
//! during scope computation and never afterwards:
//! - the overridden set, filled once when overrides are bound;
//! - an [`Visibility::Unknown`] visibility, replaced once by the inferred one.

use crate::class_descriptor::LazyClassDescriptor;
use crate::declarations::NodeId;
use crate::types::{FqName, Type};
use lzr_common::{Name, Span};
use lzr_storage::LazyValue;
use once_cell::unsync::OnceCell;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

// =============================================================================
// Visibility and modality
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
    Local,
    /// Not known at declaration time (an `override` without a modifier).
    /// Replaced by the inferred visibility before the member is handed out.
    Unknown,
}

impl Visibility {
    fn rank(self) -> Option<u8> {
        match self {
            Visibility::Public => Some(4),
            Visibility::Protected | Visibility::Internal => Some(3),
            Visibility::Private => Some(2),
            Visibility::Local => Some(1),
            Visibility::Unknown => None,
        }
    }

    /// Partial order: `Protected` and `Internal` are incomparable, and
    /// `Unknown` compares with nothing.
    pub fn compare(self, other: Visibility) -> Option<Ordering> {
        if self == other {
            return (self != Visibility::Unknown).then_some(Ordering::Equal);
        }
        let (a, b) = (self.rank()?, other.rank()?);
        if a == b {
            // Protected vs Internal
            return None;
        }
        Some(a.cmp(&b))
    }

    pub fn is_private(self) -> bool {
        matches!(self, Visibility::Private | Visibility::Local)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
            Visibility::Local => "local",
            Visibility::Unknown => "<unknown>",
        }
    }
}

/// The greatest of `visibilities`, or `None` when they have no greatest
/// element. An empty input yields `Public`.
pub fn find_max_visibility(visibilities: &[Visibility]) -> Option<Visibility> {
    let Some(&first) = visibilities.first() else {
        return Some(Visibility::Public);
    };
    let mut max = first;
    for &visibility in &visibilities[1..] {
        if visibility.compare(max) == Some(Ordering::Greater) {
            max = visibility;
        }
    }
    let dominates_all = visibilities
        .iter()
        .all(|&visibility| matches!(max.compare(visibility), Some(Ordering::Greater | Ordering::Equal)));
    dominates_all.then_some(max)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    Final,
    Sealed,
    Open,
    Abstract,
}

/// How a callable member came to exist in its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Declaration,
    FakeOverride,
    Delegation,
    Synthesized,
}

/// Where a member's platform method comes from. Only used to rank clash
/// diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MemberOrigin {
    #[default]
    Other,
    /// Body of an interface default method compiled into a helper class.
    DefaultImpl,
    /// Facade of a multifile class.
    MultifileClass,
    /// One part of a multifile class.
    MultifileClassPart,
}

/// Pointer back into the syntax tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceElement {
    pub node: NodeId,
    pub span: Span,
}

// =============================================================================
// Owners
// =============================================================================

/// Non-owning back-reference to the container of a descriptor.
#[derive(Clone)]
pub enum DescriptorOwner {
    Package(FqName),
    Class {
        fq_name: FqName,
        class: Weak<LazyClassDescriptor>,
    },
}

impl DescriptorOwner {
    pub fn for_class(class: &Rc<LazyClassDescriptor>) -> DescriptorOwner {
        DescriptorOwner::Class {
            fq_name: class.fq_name().clone(),
            class: Rc::downgrade(class),
        }
    }

    pub fn fq_name(&self) -> &FqName {
        match self {
            DescriptorOwner::Package(fq_name) | DescriptorOwner::Class { fq_name, .. } => fq_name,
        }
    }

    pub fn class(&self) -> Option<Rc<LazyClassDescriptor>> {
        match self {
            DescriptorOwner::Class { class, .. } => class.upgrade(),
            DescriptorOwner::Package(_) => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, DescriptorOwner::Class { .. })
    }
}

impl fmt::Debug for DescriptorOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorOwner::Package(fq_name) => write!(f, "package {fq_name}"),
            DescriptorOwner::Class { fq_name, .. } => write!(f, "class {fq_name}"),
        }
    }
}

// =============================================================================
// Member data shared by functions and properties
// =============================================================================

pub struct MemberData {
    pub name: Name,
    pub owner: DescriptorOwner,
    pub kind: CallableKind,
    pub modality: Modality,
    visibility: Cell<Visibility>,
    pub is_expect: bool,
    pub origin: MemberOrigin,
    pub source: Option<SourceElement>,
}

impl MemberData {
    pub fn new(
        name: Name,
        owner: DescriptorOwner,
        kind: CallableKind,
        modality: Modality,
        visibility: Visibility,
    ) -> MemberData {
        MemberData {
            name,
            owner,
            kind,
            modality,
            visibility: Cell::new(visibility),
            is_expect: false,
            origin: MemberOrigin::Other,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<SourceElement>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: MemberOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn expect(mut self, is_expect: bool) -> Self {
        self.is_expect = is_expect;
        self
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    pub(crate) fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
    }

    /// Data for a copy of this member placed into `owner`. The source is
    /// kept only when `keep_source` is set (main-scope copies); fake
    /// overrides and delegates have none.
    pub fn derived(
        &self,
        owner: DescriptorOwner,
        kind: CallableKind,
        modality: Modality,
        visibility: Visibility,
        keep_source: bool,
    ) -> MemberData {
        MemberData {
            name: self.name,
            owner,
            kind,
            modality,
            visibility: Cell::new(visibility),
            is_expect: self.is_expect,
            origin: self.origin,
            source: if keep_source { self.source } else { None },
        }
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// What overriding compares: name, receiver and parameter types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: Name,
    pub receiver: Option<Type>,
    pub parameters: Vec<Type>,
}

impl Signature {
    /// Signature with types replaced by their platform erasure.
    pub fn erased(&self) -> Vec<String> {
        self.receiver
            .iter()
            .chain(&self.parameters)
            .map(Type::erased)
            .collect()
    }
}

// =============================================================================
// Functions and properties
// =============================================================================

#[derive(Clone)]
pub struct ValueParameterDescriptor {
    pub name: Name,
    pub index: usize,
    pub ty: Type,
    pub declares_default_value: bool,
    /// For `copy` parameters: the property whose value is the default.
    pub default_from_property: Option<Rc<PropertyDescriptor>>,
    pub source: Option<SourceElement>,
}

impl ValueParameterDescriptor {
    pub fn new(name: Name, index: usize, ty: Type) -> ValueParameterDescriptor {
        ValueParameterDescriptor {
            name,
            index,
            ty,
            declares_default_value: false,
            default_from_property: None,
            source: None,
        }
    }
}

impl fmt::Debug for ValueParameterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)?;
        if self.declares_default_value {
            f.write_str(" = ...")?;
        }
        Ok(())
    }
}

type Overridden<T> = RefCell<SmallVec<[Rc<T>; 2]>>;

pub struct FunctionDescriptor {
    member: MemberData,
    pub type_parameters: Vec<Name>,
    pub receiver: Option<Type>,
    pub value_parameters: Vec<ValueParameterDescriptor>,
    pub return_type: Type,
    pub is_operator: bool,
    overridden: Overridden<FunctionDescriptor>,
}

impl FunctionDescriptor {
    pub fn new(
        member: MemberData,
        receiver: Option<Type>,
        value_parameters: Vec<ValueParameterDescriptor>,
        return_type: Type,
    ) -> FunctionDescriptor {
        FunctionDescriptor {
            member,
            type_parameters: Vec::new(),
            receiver,
            value_parameters,
            return_type,
            is_operator: false,
            overridden: RefCell::new(SmallVec::new()),
        }
    }

    #[must_use]
    pub fn operator(mut self) -> Self {
        self.is_operator = true;
        self
    }

    #[must_use]
    pub fn with_type_parameters(mut self, type_parameters: Vec<Name>) -> Self {
        self.type_parameters = type_parameters;
        self
    }
}

pub struct PropertyDescriptor {
    member: MemberData,
    pub receiver: Option<Type>,
    pub ty: Type,
    pub is_var: bool,
    overridden: Overridden<PropertyDescriptor>,
}

impl PropertyDescriptor {
    pub fn new(member: MemberData, receiver: Option<Type>, ty: Type, is_var: bool) -> Self {
        PropertyDescriptor {
            member,
            receiver,
            ty,
            is_var,
            overridden: RefCell::new(SmallVec::new()),
        }
    }
}

/// Common surface of functions and properties, the two member kinds that
/// take part in overriding.
pub trait CallableMember: Sized + 'static {
    /// `fun` or `val`, used in rendered descriptions.
    const KEYWORD: &'static str;

    fn member(&self) -> &MemberData;

    fn signature(&self) -> Signature;

    /// Return type of a function, type of a property.
    fn value_type(&self) -> &Type;

    fn overridden_cell(&self) -> &Overridden<Self>;

    /// Copy of this member with other member data and no overridden set.
    fn with_member_data(&self, member: MemberData) -> Self;

    fn into_declaration(this: Rc<Self>) -> DeclarationDescriptor;

    /// Platform signature used for clash detection.
    fn jvm_signature(&self) -> String;

    fn name(&self) -> Name {
        self.member().name
    }

    fn kind(&self) -> CallableKind {
        self.member().kind
    }

    fn modality(&self) -> Modality {
        self.member().modality
    }

    fn visibility(&self) -> Visibility {
        self.member().visibility()
    }

    fn overridden(&self) -> Vec<Rc<Self>> {
        self.overridden_cell().borrow().to_vec()
    }

    /// Record that this member overrides `overridden`. Adding the same
    /// descriptor twice is a no-op.
    fn add_overridden(&self, overridden: Rc<Self>) {
        let mut cell = self.overridden_cell().borrow_mut();
        if !cell.iter().any(|existing| Rc::ptr_eq(existing, &overridden)) {
            cell.push(overridden);
        }
    }

    /// `fun pkg.A.f(Int): Unit` style rendering for diagnostics.
    fn describe(&self) -> String {
        let signature = self.signature();
        let mut text = format!("{} {}.", Self::KEYWORD, self.member().owner.fq_name());
        if let Some(receiver) = &signature.receiver {
            text.push_str(&format!("({receiver})."));
        }
        text.push_str(&signature.name.as_str());
        if Self::KEYWORD == "fun" {
            let parameters: Vec<String> = signature.parameters.iter().map(ToString::to_string).collect();
            text.push_str(&format!("({})", parameters.join(", ")));
        }
        text.push_str(&format!(": {}", self.value_type()));
        text
    }
}

impl CallableMember for FunctionDescriptor {
    const KEYWORD: &'static str = "fun";

    fn member(&self) -> &MemberData {
        &self.member
    }

    fn signature(&self) -> Signature {
        Signature {
            name: self.member.name,
            receiver: self.receiver.clone(),
            parameters: self.value_parameters.iter().map(|p| p.ty.clone()).collect(),
        }
    }

    fn value_type(&self) -> &Type {
        &self.return_type
    }

    fn overridden_cell(&self) -> &Overridden<Self> {
        &self.overridden
    }

    fn with_member_data(&self, member: MemberData) -> Self {
        FunctionDescriptor {
            member,
            type_parameters: self.type_parameters.clone(),
            receiver: self.receiver.clone(),
            value_parameters: self.value_parameters.clone(),
            return_type: self.return_type.clone(),
            is_operator: self.is_operator,
            overridden: RefCell::new(SmallVec::new()),
        }
    }

    fn into_declaration(this: Rc<Self>) -> DeclarationDescriptor {
        DeclarationDescriptor::Function(this)
    }

    fn jvm_signature(&self) -> String {
        format!("{}({})", self.member.name, self.signature().erased().join(","))
    }
}

impl CallableMember for PropertyDescriptor {
    const KEYWORD: &'static str = "val";

    fn member(&self) -> &MemberData {
        &self.member
    }

    fn signature(&self) -> Signature {
        Signature {
            name: self.member.name,
            receiver: self.receiver.clone(),
            parameters: Vec::new(),
        }
    }

    fn value_type(&self) -> &Type {
        &self.ty
    }

    fn overridden_cell(&self) -> &Overridden<Self> {
        &self.overridden
    }

    fn with_member_data(&self, member: MemberData) -> Self {
        PropertyDescriptor {
            member,
            receiver: self.receiver.clone(),
            ty: self.ty.clone(),
            is_var: self.is_var,
            overridden: RefCell::new(SmallVec::new()),
        }
    }

    fn into_declaration(this: Rc<Self>) -> DeclarationDescriptor {
        DeclarationDescriptor::Property(this)
    }

    /// Properties clash through their getter.
    fn jvm_signature(&self) -> String {
        format!("{}({})", getter_name(self.member.name), self.signature().erased().join(","))
    }
}

fn getter_name(property: Name) -> String {
    let text = property.as_str();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]", self.describe(), self.member.kind)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]", self.describe(), self.member.kind)
    }
}

// =============================================================================
// Constructors and type aliases
// =============================================================================

pub struct ConstructorDescriptor {
    pub owner: DescriptorOwner,
    pub is_primary: bool,
    pub kind: CallableKind,
    pub visibility: Visibility,
    pub value_parameters: Vec<ValueParameterDescriptor>,
    pub source: Option<SourceElement>,
    return_type: OnceCell<LazyValue<Type>>,
}

impl ConstructorDescriptor {
    pub fn new(
        owner: DescriptorOwner,
        is_primary: bool,
        visibility: Visibility,
        value_parameters: Vec<ValueParameterDescriptor>,
    ) -> ConstructorDescriptor {
        ConstructorDescriptor {
            owner,
            is_primary,
            kind: CallableKind::Declaration,
            visibility,
            value_parameters,
            source: None,
            return_type: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<SourceElement>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: CallableKind) -> Self {
        self.kind = kind;
        self
    }

    /// Install the return type computation. Later calls are ignored.
    pub fn set_deferred_return_type(&self, return_type: LazyValue<Type>) {
        let _ = self.return_type.set(return_type);
    }

    pub fn has_return_type(&self) -> bool {
        self.return_type.get().is_some()
    }

    pub fn is_return_type_computed(&self) -> bool {
        self.return_type.get().is_some_and(LazyValue::is_computed)
    }

    pub fn return_type(&self) -> Type {
        match self.return_type.get() {
            Some(deferred) => deferred.get(),
            None => Type::error("constructor return type is not set"),
        }
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("owner", &self.owner)
            .field("is_primary", &self.is_primary)
            .field("visibility", &self.visibility)
            .field("value_parameters", &self.value_parameters)
            .finish()
    }
}

pub struct TypeAliasDescriptor {
    pub name: Name,
    pub owner: DescriptorOwner,
    pub visibility: Visibility,
    pub is_expect: bool,
    pub expanded: Type,
    pub source: Option<SourceElement>,
}

impl fmt::Debug for TypeAliasDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "typealias {}.{} = {}", self.owner.fq_name(), self.name, self.expanded)
    }
}

// =============================================================================
// Descriptor unions
// =============================================================================

/// Result of a classifier lookup.
#[derive(Clone)]
pub enum ClassifierDescriptor {
    Class(Rc<LazyClassDescriptor>),
    TypeAlias(Rc<TypeAliasDescriptor>),
}

impl ClassifierDescriptor {
    pub fn name(&self) -> Name {
        match self {
            ClassifierDescriptor::Class(class) => class.name(),
            ClassifierDescriptor::TypeAlias(alias) => alias.name,
        }
    }

    pub fn is_expect(&self) -> bool {
        match self {
            ClassifierDescriptor::Class(class) => class.is_expect(),
            ClassifierDescriptor::TypeAlias(alias) => alias.is_expect,
        }
    }

    pub fn as_class(&self) -> Option<&Rc<LazyClassDescriptor>> {
        match self {
            ClassifierDescriptor::Class(class) => Some(class),
            ClassifierDescriptor::TypeAlias(_) => None,
        }
    }
}

impl fmt::Debug for ClassifierDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierDescriptor::Class(class) => write!(f, "class {}", class.fq_name()),
            ClassifierDescriptor::TypeAlias(alias) => alias.fmt(f),
        }
    }
}

/// Anything a member scope can list. Equality and hashing are by identity.
#[derive(Clone)]
pub enum DeclarationDescriptor {
    Class(Rc<LazyClassDescriptor>),
    TypeAlias(Rc<TypeAliasDescriptor>),
    Function(Rc<FunctionDescriptor>),
    Property(Rc<PropertyDescriptor>),
}

impl DeclarationDescriptor {
    pub fn name(&self) -> Name {
        match self {
            DeclarationDescriptor::Class(class) => class.name(),
            DeclarationDescriptor::TypeAlias(alias) => alias.name,
            DeclarationDescriptor::Function(function) => function.name(),
            DeclarationDescriptor::Property(property) => property.name(),
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionDescriptor>> {
        match self {
            DeclarationDescriptor::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&Rc<PropertyDescriptor>> {
        match self {
            DeclarationDescriptor::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Rc<LazyClassDescriptor>> {
        match self {
            DeclarationDescriptor::Class(class) => Some(class),
            _ => None,
        }
    }

    fn address(&self) -> *const () {
        match self {
            DeclarationDescriptor::Class(class) => Rc::as_ptr(class).cast(),
            DeclarationDescriptor::TypeAlias(alias) => Rc::as_ptr(alias).cast(),
            DeclarationDescriptor::Function(function) => Rc::as_ptr(function).cast(),
            DeclarationDescriptor::Property(property) => Rc::as_ptr(property).cast(),
        }
    }
}

impl From<ClassifierDescriptor> for DeclarationDescriptor {
    fn from(classifier: ClassifierDescriptor) -> Self {
        match classifier {
            ClassifierDescriptor::Class(class) => DeclarationDescriptor::Class(class),
            ClassifierDescriptor::TypeAlias(alias) => DeclarationDescriptor::TypeAlias(alias),
        }
    }
}

impl PartialEq for DeclarationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.address(), other.address())
    }
}

impl Eq for DeclarationDescriptor {}

impl Hash for DeclarationDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for DeclarationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationDescriptor::Class(class) => write!(f, "class {}", class.fq_name()),
            DeclarationDescriptor::TypeAlias(alias) => alias.fmt(f),
            DeclarationDescriptor::Function(function) => function.fmt(f),
            DeclarationDescriptor::Property(property) => property.fmt(f),
        }
    }
}

#[cfg(test)]
#[path = "tests/descriptors_tests.rs"]
mod tests;
