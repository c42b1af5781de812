//! Members synthesized for data classes: `componentN` and `copy`.

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptors::{
    CallableKind, DescriptorOwner, FunctionDescriptor, MemberData, Modality, PropertyDescriptor,
    ValueParameterDescriptor, Visibility,
};
use crate::trace::DiagnosticTrace;
use lzr_common::Name;
use std::rc::Rc;

const COMPONENT_PREFIX: &str = "component";

/// `component1`, `component2`, ...
pub fn component_name(index: usize) -> Name {
    Name::identifier(&format!("{COMPONENT_PREFIX}{index}"))
}

/// Whether `name` has the shape of a component function name.
pub fn is_component_like(name: Name) -> bool {
    let text = name.as_str();
    text.strip_prefix(COMPONENT_PREFIX)
        .and_then(|index| index.parse::<usize>().ok())
        .is_some_and(|index| index > 0)
}

pub fn copy_name() -> Name {
    Name::identifier("copy")
}

/// `componentN()` returning `property`.
pub fn create_component_function(
    class: &Rc<LazyClassDescriptor>,
    parameter: &ValueParameterDescriptor,
    property: &PropertyDescriptor,
    index: usize,
) -> Rc<FunctionDescriptor> {
    let member = MemberData::new(
        component_name(index),
        DescriptorOwner::for_class(class),
        CallableKind::Synthesized,
        Modality::Final,
        Visibility::Public,
    )
    .with_source(parameter.source);
    Rc::new(FunctionDescriptor::new(member, None, Vec::new(), property.ty.clone()).operator())
}

/// `copy(...)` with one defaulted parameter per primary-constructor
/// parameter. A parameter backed by a property defaults to it.
pub fn create_copy_function(
    class: &Rc<LazyClassDescriptor>,
    constructor_parameters: &[ValueParameterDescriptor],
    visibility: Visibility,
    trace: &DiagnosticTrace,
) -> Rc<FunctionDescriptor> {
    let parameters = constructor_parameters
        .iter()
        .map(|parameter| ValueParameterDescriptor {
            name: parameter.name,
            index: parameter.index,
            ty: parameter.ty.clone(),
            declares_default_value: true,
            default_from_property: parameter
                .source
                .and_then(|source| trace.parameter_property(source.node)),
            source: None,
        })
        .collect();
    let member = MemberData::new(
        copy_name(),
        DescriptorOwner::for_class(class),
        CallableKind::Synthesized,
        Modality::Final,
        visibility,
    )
    .with_source(Some(class.source()));
    Rc::new(FunctionDescriptor::new(member, None, parameters, class.default_type()))
}

#[cfg(test)]
#[path = "tests/data_class_tests.rs"]
mod tests;
