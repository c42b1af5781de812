//! Members generated for interfaces implemented by delegation
//! (`class C(d: I) : I by d`).

use crate::class_descriptor::LazyClassDescriptor;
use crate::class_scope::ClassMemberScope;
use crate::declarations::ClassKind;
use crate::descriptor_set::DescriptorSet;
use crate::descriptors::{CallableKind, CallableMember, DescriptorOwner, Modality, Visibility};
use crate::overriding::{Overridability, is_overridable_by};
use lzr_common::Name;
use std::rc::Rc;
use tracing::trace;

/// Delegating copies of the members named `name` of every delegated
/// interface, skipping what the class already overrides and what cannot be
/// overridden. `members_of` extracts the candidates from an interface's scope.
pub fn generate_delegated_members<D: CallableMember>(
    class: &Rc<LazyClassDescriptor>,
    name: Name,
    existing: &DescriptorSet<D>,
    members_of: impl Fn(&ClassMemberScope, Name) -> Vec<Rc<D>>,
) -> Vec<Rc<D>> {
    let delegated = class.delegated_supertypes();
    if delegated.is_empty() {
        return Vec::new();
    }
    let owner = DescriptorOwner::for_class(class);
    let mut generated: Vec<Rc<D>> = Vec::new();
    for ty in delegated {
        let Some(interface) = ty.class_descriptor() else {
            continue;
        };
        if interface.kind() != ClassKind::Interface {
            continue;
        }
        for candidate in members_of(&interface.member_scope(), name) {
            if candidate.modality() == Modality::Final || candidate.visibility().is_private() {
                continue;
            }
            let overridden_here = existing
                .iter()
                .chain(&generated)
                .any(|member| is_overridable_by(&*candidate, &**member) == Overridability::Overridable);
            if overridden_here {
                continue;
            }
            trace!(target: "lzr::override", class = %class.fq_name(), member = %candidate.describe(), "delegating member");
            let data = candidate.member().derived(
                owner.clone(),
                CallableKind::Delegation,
                Modality::Open,
                Visibility::Unknown,
                false,
            );
            generated.push(Rc::new(candidate.with_member_data(data)));
        }
    }
    generated
}
