//! Declaration providers: raw declaration nodes of one container, by name.
//!
//! Scopes never walk syntax trees themselves. They ask a provider for the
//! nodes with a given name and resolve those. Providers index eagerly and are
//! read-only afterwards.

use crate::declarations::{
    ClassDeclaration, DeclarationNode, FunctionDeclaration, ParameterDeclaration,
    PropertyDeclaration, SourceFile, TypeAliasDeclaration,
};
use crate::kind_filter::{DescriptorKindFilter, NameFilter};
use crate::types::FqName;
use indexmap::{IndexMap, IndexSet};
use lzr_common::Name;
use rustc_hash::FxBuildHasher;
use std::rc::Rc;

pub trait DeclarationProvider {
    /// Every declaration node of the container that may produce a descriptor
    /// of an accepted kind with an accepted name, in declaration order.
    fn declarations(
        &self,
        kind_filter: DescriptorKindFilter,
        name_filter: &NameFilter<'_>,
    ) -> Vec<DeclarationNode>;

    fn function_declarations(&self, name: Name) -> Vec<Rc<FunctionDeclaration>>;

    fn property_declarations(&self, name: Name) -> Vec<Rc<PropertyDeclaration>>;

    /// Entries of container-level destructuring declarations named `name`.
    fn destructuring_entries(&self, name: Name) -> Vec<Rc<PropertyDeclaration>>;

    fn class_or_object_declarations(&self, name: Name) -> Vec<Rc<ClassDeclaration>>;

    fn type_alias_declarations(&self, name: Name) -> Vec<Rc<TypeAliasDeclaration>>;

    /// Names of everything declared in the container, deduplicated.
    fn declaration_names(&self) -> Vec<Name>;
}

/// Provider for the body of a class or object.
pub trait ClassMemberDeclarationProvider: DeclarationProvider {
    /// The class whose members this provider lists. `None` for synthetic
    /// containers with no syntax behind them.
    fn corresponding_class_or_object(&self) -> Option<&Rc<ClassDeclaration>>;

    fn primary_constructor_parameters(&self) -> &[ParameterDeclaration];
}

type ByName<T> = IndexMap<Name, Vec<T>, FxBuildHasher>;

/// Name index over a flat list of nodes.
#[derive(Default)]
struct DeclarationIndex {
    all: Vec<DeclarationNode>,
    functions: ByName<Rc<FunctionDeclaration>>,
    properties: ByName<Rc<PropertyDeclaration>>,
    destructuring: ByName<Rc<PropertyDeclaration>>,
    classes: ByName<Rc<ClassDeclaration>>,
    type_aliases: ByName<Rc<TypeAliasDeclaration>>,
    names: IndexSet<Name, FxBuildHasher>,
}

impl DeclarationIndex {
    fn put(&mut self, node: DeclarationNode) {
        match &node {
            DeclarationNode::Function(function) => {
                self.functions.entry(function.name).or_default().push(Rc::clone(function));
            }
            DeclarationNode::Property(property) => {
                self.properties.entry(property.name).or_default().push(Rc::clone(property));
            }
            DeclarationNode::Class(class) => {
                self.classes.entry(class.name).or_default().push(Rc::clone(class));
            }
            DeclarationNode::TypeAlias(alias) => {
                self.type_aliases.entry(alias.name).or_default().push(Rc::clone(alias));
            }
            DeclarationNode::Destructuring(destructuring) => {
                for entry in &destructuring.entries {
                    self.destructuring.entry(entry.name).or_default().push(Rc::clone(entry));
                    self.names.insert(entry.name);
                }
            }
            DeclarationNode::Parameter(_)
            | DeclarationNode::AnonymousInitializer(_)
            | DeclarationNode::Unsupported { .. } => {}
        }
        if let Some(name) = node.name() {
            self.names.insert(name);
        }
        self.all.push(node);
    }

    fn declarations(
        &self,
        kind_filter: DescriptorKindFilter,
        name_filter: &NameFilter<'_>,
    ) -> Vec<DeclarationNode> {
        self.all
            .iter()
            .filter(|node| {
                let kind_matches = match node {
                    DeclarationNode::Class(_) | DeclarationNode::TypeAlias(_) => {
                        kind_filter.accepts_classifiers()
                    }
                    DeclarationNode::Function(_) => kind_filter.intersects(DescriptorKindFilter::FUNCTIONS),
                    DeclarationNode::Property(_)
                    | DeclarationNode::Parameter(_)
                    | DeclarationNode::Destructuring(_) => {
                        kind_filter.intersects(DescriptorKindFilter::VARIABLES)
                    }
                    // Always handed out; the scope decides what they mean.
                    DeclarationNode::AnonymousInitializer(_) | DeclarationNode::Unsupported { .. } => true,
                };
                kind_matches && node.name().is_none_or(|name| name_filter.accepts(name))
            })
            .cloned()
            .collect()
    }

    fn get<T: Clone>(map: &ByName<T>, name: Name) -> Vec<T> {
        map.get(&name).cloned().unwrap_or_default()
    }
}

macro_rules! delegate_to_index {
    () => {
        fn declarations(
            &self,
            kind_filter: DescriptorKindFilter,
            name_filter: &NameFilter<'_>,
        ) -> Vec<DeclarationNode> {
            self.index.declarations(kind_filter, name_filter)
        }

        fn function_declarations(&self, name: Name) -> Vec<Rc<FunctionDeclaration>> {
            DeclarationIndex::get(&self.index.functions, name)
        }

        fn property_declarations(&self, name: Name) -> Vec<Rc<PropertyDeclaration>> {
            DeclarationIndex::get(&self.index.properties, name)
        }

        fn destructuring_entries(&self, name: Name) -> Vec<Rc<PropertyDeclaration>> {
            DeclarationIndex::get(&self.index.destructuring, name)
        }

        fn class_or_object_declarations(&self, name: Name) -> Vec<Rc<ClassDeclaration>> {
            DeclarationIndex::get(&self.index.classes, name)
        }

        fn type_alias_declarations(&self, name: Name) -> Vec<Rc<TypeAliasDeclaration>> {
            DeclarationIndex::get(&self.index.type_aliases, name)
        }

        fn declaration_names(&self) -> Vec<Name> {
            self.index.names.iter().copied().collect()
        }
    };
}

// =============================================================================
// Class bodies
// =============================================================================

pub struct ClassDeclarationProvider {
    class: Rc<ClassDeclaration>,
    index: DeclarationIndex,
}

impl ClassDeclarationProvider {
    pub fn new(class: Rc<ClassDeclaration>) -> Self {
        let mut index = DeclarationIndex::default();
        // `val`/`var` constructor parameters are members of the class body.
        for parameter in class.primary_constructor_parameters() {
            if parameter.has_val_or_var() {
                index.put(DeclarationNode::Parameter(Rc::new(parameter.clone())));
            }
        }
        for member in &class.members {
            index.put(member.clone());
        }
        ClassDeclarationProvider { class, index }
    }
}

impl DeclarationProvider for ClassDeclarationProvider {
    delegate_to_index!();
}

impl ClassMemberDeclarationProvider for ClassDeclarationProvider {
    fn corresponding_class_or_object(&self) -> Option<&Rc<ClassDeclaration>> {
        Some(&self.class)
    }

    fn primary_constructor_parameters(&self) -> &[ParameterDeclaration] {
        self.class.primary_constructor_parameters()
    }
}

// =============================================================================
// Package fragments
// =============================================================================

/// Top-level declarations of every file contributing to one package.
pub struct FileDeclarationProvider {
    package: FqName,
    index: DeclarationIndex,
}

impl FileDeclarationProvider {
    /// Index the files whose package is `package`; other files are ignored.
    pub fn new(package: FqName, files: &[SourceFile]) -> Self {
        let mut index = DeclarationIndex::default();
        for file in files.iter().filter(|file| file.package == package) {
            for declaration in &file.declarations {
                index.put(declaration.clone());
            }
        }
        FileDeclarationProvider { package, index }
    }

    pub fn package(&self) -> &FqName {
        &self.package
    }
}

impl DeclarationProvider for FileDeclarationProvider {
    delegate_to_index!();
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
