//! Parent-linked lexical scope chains.
//!
//! A [`LexicalScope`] answers "what does this simple name mean here" for
//! classifiers and type parameters, walking outwards through its parents.
//! Scopes hold their classes weakly and query member scopes only when a name
//! is actually looked up, so building a chain never forces member resolution.

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptors::{ClassifierDescriptor, TypeAliasDescriptor};
use crate::lookup::LookupLocation;
use crate::member_scope::LazyMemberScope;
use crate::package_scope::PackageMemberScope;
use crate::types::FqName;
use lzr_common::Name;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexicalScopeKind {
    Package,
    ClassHeader,
    ConstructorHeader,
    ClassInheritance,
    CompanionObjectHeader,
    MemberDeclaration,
    FunctionHeader,
    /// Stand-in produced when a scope is requested while it is being built.
    Error,
}

enum ClassifierSource {
    Package(Weak<PackageMemberScope>),
    /// Nested classes of a class.
    NestedClassesOf(Weak<LazyClassDescriptor>),
    /// Nested classes of the class's companion object, found on demand.
    CompanionOf(Weak<LazyClassDescriptor>),
}

impl ClassifierSource {
    fn find(&self, name: Name, location: LookupLocation) -> Option<ClassifierDescriptor> {
        match self {
            ClassifierSource::Package(package) => package.upgrade()?.contributed_classifier(name, location),
            ClassifierSource::NestedClassesOf(class) => class
                .upgrade()?
                .member_scope()
                .contributed_classifier(name, location),
            ClassifierSource::CompanionOf(class) => class
                .upgrade()?
                .companion_object()?
                .member_scope()
                .contributed_classifier(name, location),
        }
    }
}

/// What a name means in a lexical scope.
#[derive(Clone, Debug)]
pub enum LexicalClassifier {
    Class(Rc<LazyClassDescriptor>),
    TypeAlias(Rc<TypeAliasDescriptor>),
    TypeParameter(Name),
}

pub struct LexicalScope {
    kind: LexicalScopeKind,
    owner: FqName,
    parent: Option<Rc<LexicalScope>>,
    type_parameters: Vec<Name>,
    sources: Vec<ClassifierSource>,
    implicit_receiver: Option<ImplicitReceiver>,
}

enum ImplicitReceiver {
    This(Weak<LazyClassDescriptor>),
    CompanionOf(Weak<LazyClassDescriptor>),
}

impl LexicalScope {
    /// Outermost scope: the top-level classifiers of a package.
    pub fn package(package: &Rc<PackageMemberScope>) -> Rc<LexicalScope> {
        Rc::new(LexicalScope {
            kind: LexicalScopeKind::Package,
            owner: package.fq_name().clone(),
            parent: None,
            type_parameters: Vec::new(),
            sources: vec![ClassifierSource::Package(Rc::downgrade(package))],
            implicit_receiver: None,
        })
    }

    /// Sentinel for a scope requested while it was being built. It knows no
    /// names, so everything resolved in it becomes an error type.
    pub fn error(owner: &FqName) -> Rc<LexicalScope> {
        Rc::new(LexicalScope {
            kind: LexicalScopeKind::Error,
            owner: owner.clone(),
            parent: None,
            type_parameters: Vec::new(),
            sources: Vec::new(),
            implicit_receiver: None,
        })
    }

    /// `parent` plus the given type parameters.
    pub fn with_type_parameters(
        parent: Rc<LexicalScope>,
        kind: LexicalScopeKind,
        owner: &FqName,
        type_parameters: Vec<Name>,
    ) -> Rc<LexicalScope> {
        Rc::new(LexicalScope {
            kind,
            owner: owner.clone(),
            parent: Some(parent),
            type_parameters,
            sources: Vec::new(),
            implicit_receiver: None,
        })
    }

    /// Static contribution of `class`: its nested classes and, with
    /// `with_companion`, its companion object's nested classes and receiver.
    pub(crate) fn inheritance(
        parent: Rc<LexicalScope>,
        owner: &FqName,
        class: &Rc<LazyClassDescriptor>,
        with_companion: bool,
    ) -> Rc<LexicalScope> {
        let mut sources = vec![ClassifierSource::NestedClassesOf(Rc::downgrade(class))];
        let mut implicit_receiver = None;
        let kind = if with_companion {
            sources.push(ClassifierSource::CompanionOf(Rc::downgrade(class)));
            implicit_receiver = Some(ImplicitReceiver::CompanionOf(Rc::downgrade(class)));
            LexicalScopeKind::ClassInheritance
        } else {
            LexicalScopeKind::CompanionObjectHeader
        };
        Rc::new(LexicalScope {
            kind,
            owner: owner.clone(),
            parent: Some(parent),
            type_parameters: Vec::new(),
            sources,
            implicit_receiver,
        })
    }

    /// Member bodies: `this` is the class instance.
    pub(crate) fn member_declaration(
        parent: Rc<LexicalScope>,
        class: &Rc<LazyClassDescriptor>,
    ) -> Rc<LexicalScope> {
        Rc::new(LexicalScope {
            kind: LexicalScopeKind::MemberDeclaration,
            owner: class.fq_name().clone(),
            parent: Some(parent),
            type_parameters: Vec::new(),
            sources: Vec::new(),
            implicit_receiver: Some(ImplicitReceiver::This(Rc::downgrade(class))),
        })
    }

    #[inline]
    pub fn kind(&self) -> LexicalScopeKind {
        self.kind
    }

    pub fn owner(&self) -> &FqName {
        &self.owner
    }

    pub fn parent(&self) -> Option<&Rc<LexicalScope>> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == LexicalScopeKind::Error
    }

    /// Whether this scope or any parent is an error scope.
    pub fn contains_error(&self) -> bool {
        self.chain().any(LexicalScope::is_error)
    }

    pub fn chain(&self) -> impl Iterator<Item = &LexicalScope> {
        std::iter::successors(Some(self), |&scope| scope.parent.as_deref())
    }

    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Innermost-first meaning of `name`.
    pub fn find_classifier(&self, name: Name, location: LookupLocation) -> Option<LexicalClassifier> {
        for scope in self.chain() {
            if scope.type_parameters.contains(&name) {
                return Some(LexicalClassifier::TypeParameter(name));
            }
            for source in &scope.sources {
                match source.find(name, location) {
                    Some(ClassifierDescriptor::Class(class)) => return Some(LexicalClassifier::Class(class)),
                    Some(ClassifierDescriptor::TypeAlias(alias)) => {
                        return Some(LexicalClassifier::TypeAlias(alias));
                    }
                    None => {}
                }
            }
        }
        None
    }

    /// Implicit receivers, innermost first.
    pub fn implicit_receivers(&self) -> Vec<Rc<LazyClassDescriptor>> {
        self.chain()
            .filter_map(|scope| match scope.implicit_receiver.as_ref()? {
                ImplicitReceiver::This(class) => class.upgrade(),
                ImplicitReceiver::CompanionOf(class) => class.upgrade()?.companion_object(),
            })
            .collect()
    }
}

impl fmt::Debug for LexicalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self
            .chain()
            .map(|scope| format!("{:?}({})", scope.kind, scope.owner))
            .collect();
        write!(f, "LexicalScope[{}]", kinds.join(" -> "))
    }
}

#[cfg(test)]
#[path = "tests/lexical_scope_tests.rs"]
mod tests;
