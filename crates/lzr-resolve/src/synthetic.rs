//! Plugin hooks that inject members with no source declaration.
//!
//! Both hooks are capability objects: scopes call them at fixed points and
//! never look at the concrete type behind them. Every method has a no-op
//! default, so a plugin implements only what it contributes.

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptor_set::DescriptorSet;
use crate::descriptors::{ConstructorDescriptor, FunctionDescriptor, PropertyDescriptor};
use crate::lookup::LookupLocation;
use lzr_common::Name;
use std::rc::Rc;

pub trait SyntheticResolveExtension {
    /// Name of a companion object the class needs but does not declare.
    fn synthetic_companion_object_name(&self, _class: &LazyClassDescriptor) -> Option<Name> {
        None
    }

    fn synthetic_function_names(&self, _class: &LazyClassDescriptor) -> Vec<Name> {
        Vec::new()
    }

    fn synthetic_property_names(&self, _class: &LazyClassDescriptor) -> Vec<Name> {
        Vec::new()
    }

    /// Every nested class name this extension could generate, or `None` when
    /// it cannot say without generating them.
    fn possible_synthetic_nested_class_names(&self, _class: &LazyClassDescriptor) -> Option<Vec<Name>> {
        Some(Vec::new())
    }

    fn synthetic_nested_class_names(&self, _class: &LazyClassDescriptor) -> Vec<Name> {
        Vec::new()
    }

    fn generate_synthetic_classes(
        &self,
        _class: &Rc<LazyClassDescriptor>,
        _name: Name,
        _result: &mut DescriptorSet<LazyClassDescriptor>,
    ) {
    }

    fn generate_synthetic_methods(
        &self,
        _class: &Rc<LazyClassDescriptor>,
        _name: Name,
        _from_supertypes: &[Rc<FunctionDescriptor>],
        _result: &mut DescriptorSet<FunctionDescriptor>,
    ) {
    }

    fn generate_synthetic_properties(
        &self,
        _class: &Rc<LazyClassDescriptor>,
        _name: Name,
        _from_supertypes: &[Rc<PropertyDescriptor>],
        _result: &mut DescriptorSet<PropertyDescriptor>,
    ) {
    }

    fn generate_synthetic_secondary_constructors(
        &self,
        _class: &Rc<LazyClassDescriptor>,
        _result: &mut Vec<Rc<ConstructorDescriptor>>,
    ) {
    }
}

/// Extension that contributes nothing.
#[derive(Debug, Default)]
pub struct NoSyntheticMembers;

impl SyntheticResolveExtension for NoSyntheticMembers {}

/// Runs several extensions in registration order.
#[derive(Default)]
pub struct CompositeSyntheticResolveExtension {
    extensions: Vec<Rc<dyn SyntheticResolveExtension>>,
}

impl CompositeSyntheticResolveExtension {
    pub fn new(extensions: Vec<Rc<dyn SyntheticResolveExtension>>) -> Self {
        CompositeSyntheticResolveExtension { extensions }
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl SyntheticResolveExtension for CompositeSyntheticResolveExtension {
    // The first extension asking for a companion names it.
    fn synthetic_companion_object_name(&self, class: &LazyClassDescriptor) -> Option<Name> {
        self.extensions
            .iter()
            .find_map(|extension| extension.synthetic_companion_object_name(class))
    }

    fn synthetic_function_names(&self, class: &LazyClassDescriptor) -> Vec<Name> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.synthetic_function_names(class))
            .collect()
    }

    fn synthetic_property_names(&self, class: &LazyClassDescriptor) -> Vec<Name> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.synthetic_property_names(class))
            .collect()
    }

    fn possible_synthetic_nested_class_names(&self, class: &LazyClassDescriptor) -> Option<Vec<Name>> {
        let mut names = Vec::new();
        for extension in &self.extensions {
            names.extend(extension.possible_synthetic_nested_class_names(class)?);
        }
        Some(names)
    }

    fn synthetic_nested_class_names(&self, class: &LazyClassDescriptor) -> Vec<Name> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.synthetic_nested_class_names(class))
            .collect()
    }

    fn generate_synthetic_classes(
        &self,
        class: &Rc<LazyClassDescriptor>,
        name: Name,
        result: &mut DescriptorSet<LazyClassDescriptor>,
    ) {
        for extension in &self.extensions {
            extension.generate_synthetic_classes(class, name, result);
        }
    }

    fn generate_synthetic_methods(
        &self,
        class: &Rc<LazyClassDescriptor>,
        name: Name,
        from_supertypes: &[Rc<FunctionDescriptor>],
        result: &mut DescriptorSet<FunctionDescriptor>,
    ) {
        for extension in &self.extensions {
            extension.generate_synthetic_methods(class, name, from_supertypes, result);
        }
    }

    fn generate_synthetic_properties(
        &self,
        class: &Rc<LazyClassDescriptor>,
        name: Name,
        from_supertypes: &[Rc<PropertyDescriptor>],
        result: &mut DescriptorSet<PropertyDescriptor>,
    ) {
        for extension in &self.extensions {
            extension.generate_synthetic_properties(class, name, from_supertypes, result);
        }
    }

    fn generate_synthetic_secondary_constructors(
        &self,
        class: &Rc<LazyClassDescriptor>,
        result: &mut Vec<Rc<ConstructorDescriptor>>,
    ) {
        for extension in &self.extensions {
            extension.generate_synthetic_secondary_constructors(class, result);
        }
    }
}

/// Backend hook contributing extra methods to a class, e.g. the parts of a
/// multifile class facade.
pub trait AdditionalClassPartsProvider {
    /// Names of every method `generate_additional_methods` can add.
    fn additional_function_names(&self, _class: &LazyClassDescriptor) -> Vec<Name> {
        Vec::new()
    }

    fn generate_additional_methods(
        &self,
        _class: &Rc<LazyClassDescriptor>,
        _result: &mut DescriptorSet<FunctionDescriptor>,
        _name: Name,
        _location: LookupLocation,
        _from_supertypes: &[Rc<FunctionDescriptor>],
    ) {
    }
}

#[derive(Debug, Default)]
pub struct NoAdditionalClassParts;

impl AdditionalClassPartsProvider for NoAdditionalClassParts {}
