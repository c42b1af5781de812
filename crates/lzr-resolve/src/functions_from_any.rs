//! `equals`, `hashCode` and `toString` synthesized for value and data classes.

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptor_set::DescriptorSet;
use crate::descriptors::{
    CallableKind, CallableMember, DescriptorOwner, FunctionDescriptor, MemberData, Modality,
    ValueParameterDescriptor, Visibility,
};
use crate::types::Type;
use lzr_common::Name;
use std::rc::Rc;

pub const FUNCTION_FROM_ANY_NAMES: [&str; 3] = ["equals", "hashCode", "toString"];

pub fn function_from_any_names() -> Vec<Name> {
    FUNCTION_FROM_ANY_NAMES.iter().map(|name| Name::identifier(name)).collect()
}

pub fn is_function_from_any_name(name: Name) -> bool {
    FUNCTION_FROM_ANY_NAMES.contains(&&*name.as_str())
}

/// Add the `Any` member named `name` unless the class already has one with
/// the same signature or a supertype made it final.
pub fn add_function_from_any_if_needed(
    class: &Rc<LazyClassDescriptor>,
    result: &mut DescriptorSet<FunctionDescriptor>,
    name: Name,
    from_supertypes: &[Rc<FunctionDescriptor>],
) {
    let Some(function) = create_function_from_any(class, name) else {
        return;
    };
    let signature = function.signature();
    let already_present = result.iter().any(|existing| existing.signature() == signature);
    let final_in_supertype = from_supertypes
        .iter()
        .any(|inherited| inherited.modality() == Modality::Final && inherited.signature() == signature);
    if already_present || final_in_supertype {
        return;
    }
    result.insert(Rc::new(function));
}

fn create_function_from_any(class: &Rc<LazyClassDescriptor>, name: Name) -> Option<FunctionDescriptor> {
    let member = MemberData::new(
        name,
        DescriptorOwner::for_class(class),
        CallableKind::Synthesized,
        Modality::Open,
        Visibility::Public,
    )
    .with_source(Some(class.source()));
    let function = match &*name.as_str() {
        "equals" => FunctionDescriptor::new(
            member,
            None,
            vec![ValueParameterDescriptor::new(Name::identifier("other"), 0, Type::nullable_any())],
            Type::boolean(),
        )
        .operator(),
        "hashCode" => FunctionDescriptor::new(member, None, Vec::new(), Type::int()),
        "toString" => FunctionDescriptor::new(member, None, Vec::new(), Type::string()),
        _ => return None,
    };
    Some(function)
}
