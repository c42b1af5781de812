//! The lexical scopes a class's pieces are resolved in.
//!
//! Each scope is built on first request and cached. Asking for a scope while
//! it is being built (a supertype whose resolution needs the class's own
//! inheritance scope, say) yields an error scope for that caller only; the
//! outer computation still publishes the real scope.

use crate::class_descriptor::LazyClassDescriptor;
use crate::error::{ResolveError, internal_error};
use crate::lexical_scope::{LexicalScope, LexicalScopeKind};
use lzr_storage::{LazyCell, StorageManager};
use std::rc::{Rc, Weak};
use tracing::debug;

type ScopeCell = LazyCell<Rc<LexicalScope>>;

pub struct ClassResolutionScopesSupport {
    class: Weak<LazyClassDescriptor>,
    class_header: ScopeCell,
    inheritance_without_me: ScopeCell,
    inheritance_with_me: ScopeCell,
    companion_object_header: ScopeCell,
    member_declaration: ScopeCell,
    static_member_declaration: ScopeCell,
    constructor_header: ScopeCell,
}

impl ClassResolutionScopesSupport {
    pub(crate) fn new(class: Weak<LazyClassDescriptor>, storage: &StorageManager) -> Self {
        ClassResolutionScopesSupport {
            class,
            class_header: storage.lazy_cell(),
            inheritance_without_me: storage.lazy_cell(),
            inheritance_with_me: storage.lazy_cell(),
            companion_object_header: storage.lazy_cell(),
            member_declaration: storage.lazy_cell(),
            static_member_declaration: storage.lazy_cell(),
            constructor_header: storage.lazy_cell(),
        }
    }

    fn class(&self) -> Rc<LazyClassDescriptor> {
        match self.class.upgrade() {
            Some(class) => class,
            None => internal_error(ResolveError::ScopeInvalidated(
                "resolution scope requested for a dropped class".to_string(),
            )),
        }
    }

    fn memoized(
        &self,
        cell: &ScopeCell,
        label: &'static str,
        build: impl FnOnce(&Rc<LazyClassDescriptor>) -> Rc<LexicalScope>,
    ) -> Rc<LexicalScope> {
        if let Some(scope) = cell.get_ref() {
            return Rc::clone(scope);
        }
        let class = self.class();
        cell.get_or_compute(
            || {
                let scope = build(&class);
                debug!(target: "lzr::support", class = %class.fq_name(), scope = label, depth = scope.depth(), "scope built");
                scope
            },
            |first_time| {
                if first_time {
                    debug!(target: "lzr::support", class = %class.fq_name(), scope = label, "scope requested while building it");
                }
                LexicalScope::error(class.fq_name())
            },
        )
    }

    /// Type parameters over the enclosing scope. Supertypes and type
    /// parameter bounds are resolved here.
    pub fn class_header(&self) -> Rc<LexicalScope> {
        self.memoized(&self.class_header, "class header", |class| {
            with_class_type_parameters(class.outer_scope(), LexicalScopeKind::ClassHeader, class)
        })
    }

    /// Static contributions of every superclass, farthest first, over the
    /// enclosing scope.
    pub fn inheritance_scope_without_me(&self) -> Rc<LexicalScope> {
        self.memoized(&self.inheritance_without_me, "inheritance without me", |class| {
            let superclasses = class.all_superclasses_without_any();
            superclasses.iter().rev().fold(class.outer_scope(), |parent, superclass| {
                LexicalScope::inheritance(parent, class.fq_name(), superclass, true)
            })
        })
    }

    pub fn inheritance_scope_with_me(&self) -> Rc<LexicalScope> {
        self.memoized(&self.inheritance_with_me, "inheritance with me", |class| {
            LexicalScope::inheritance(self.inheritance_scope_without_me(), class.fq_name(), class, true)
        })
    }

    /// Scope of the companion object's own header: the class's nested
    /// classes are visible, its companion is not.
    pub fn companion_object_header(&self) -> Rc<LexicalScope> {
        self.memoized(&self.companion_object_header, "companion object header", |class| {
            LexicalScope::inheritance(self.inheritance_scope_without_me(), class.fq_name(), class, false)
        })
    }

    /// Member signatures and bodies.
    pub fn member_declaration(&self) -> Rc<LexicalScope> {
        self.memoized(&self.member_declaration, "member declaration", |class| {
            let with_generics =
                with_class_type_parameters(self.inheritance_scope_with_me(), LexicalScopeKind::ClassHeader, class);
            LexicalScope::member_declaration(with_generics, class)
        })
    }

    /// Nested non-inner classes and objects. Objects have no outer instance
    /// distinction, so theirs is the member declaration scope.
    pub fn static_member_declaration(&self) -> Rc<LexicalScope> {
        self.memoized(&self.static_member_declaration, "static member declaration", |class| {
            if class.kind().is_singleton() {
                self.member_declaration()
            } else {
                self.inheritance_scope_with_me()
            }
        })
    }

    pub fn constructor_header(&self) -> Rc<LexicalScope> {
        self.memoized(&self.constructor_header, "constructor header", |class| {
            with_class_type_parameters(self.inheritance_scope_with_me(), LexicalScopeKind::ConstructorHeader, class)
        })
    }

    /// Labels of the scopes built so far.
    pub fn computed_scopes(&self) -> Vec<&'static str> {
        [
            (&self.class_header, "class header"),
            (&self.inheritance_without_me, "inheritance without me"),
            (&self.inheritance_with_me, "inheritance with me"),
            (&self.companion_object_header, "companion object header"),
            (&self.member_declaration, "member declaration"),
            (&self.static_member_declaration, "static member declaration"),
            (&self.constructor_header, "constructor header"),
        ]
        .into_iter()
        .filter(|(cell, _)| cell.is_computed())
        .map(|(_, label)| label)
        .collect()
    }
}

fn with_class_type_parameters(
    parent: Rc<LexicalScope>,
    kind: LexicalScopeKind,
    class: &LazyClassDescriptor,
) -> Rc<LexicalScope> {
    LexicalScope::with_type_parameters(parent, kind, class.fq_name(), class.declaration().type_parameters.clone())
}
