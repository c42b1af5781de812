//! Override binding and fake-override generation for one member name.
//!
//! Given the members a class declares (or synthesizes) under one name and the
//! members its supertypes expose under that name, every supertype member ends
//! up either overridden by a current member or inherited through exactly one
//! fake override. Conflicts are reported through an [`OverridingStrategy`].

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptors::{
    CallableKind, CallableMember, DescriptorOwner, Modality, Visibility, find_max_visibility,
};
use lzr_common::Name;
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overridability {
    Overridable,
    /// Same platform signature but incompatible declared types.
    Conflict,
    Incompatible,
}

/// Whether `sub_member` can override `super_member`.
pub fn is_overridable_by<D: CallableMember>(super_member: &D, sub_member: &D) -> Overridability {
    let super_signature = super_member.signature();
    let sub_signature = sub_member.signature();
    if super_signature.name != sub_signature.name
        || super_signature.receiver.is_some() != sub_signature.receiver.is_some()
        || super_signature.parameters.len() != sub_signature.parameters.len()
    {
        return Overridability::Incompatible;
    }
    if super_signature == sub_signature {
        return Overridability::Overridable;
    }
    if super_signature.erased() == sub_signature.erased() {
        Overridability::Conflict
    } else {
        Overridability::Incompatible
    }
}

fn both_ways_overridability<D: CallableMember>(first: &D, second: &D) -> Overridability {
    let forward = is_overridable_by(first, second);
    let backward = is_overridable_by(second, first);
    match (forward, backward) {
        (Overridability::Overridable, Overridability::Overridable) => Overridability::Overridable,
        (Overridability::Conflict, _) | (_, Overridability::Conflict) => Overridability::Conflict,
        _ => Overridability::Incompatible,
    }
}

/// Where binding results go.
pub trait OverridingStrategy<D: CallableMember> {
    fn add_fake_override(&mut self, fake_override: Rc<D>);

    fn set_overridden(&mut self, member: &Rc<D>, overridden: &[Rc<D>]) {
        for super_member in overridden {
            member.add_overridden(Rc::clone(super_member));
        }
    }

    /// `from_current` clashes with `from_super` without overriding it.
    fn override_conflict(&mut self, from_super: &Rc<D>, from_current: &Rc<D>);

    /// Two inherited members clash.
    fn inheritance_conflict(&mut self, first: &Rc<D>, second: &Rc<D>);
}

fn is_visible_for_override<D: CallableMember>(member: &D) -> bool {
    !member.visibility().is_private()
}

/// Bind current members to the supertype members they override, then
/// inherit the rest through fake overrides owned by `current`.
pub fn generate_overrides_in_function_group<D: CallableMember>(
    name: Name,
    members_from_supertypes: &[Rc<D>],
    members_from_current: &[Rc<D>],
    current: &Rc<LazyClassDescriptor>,
    strategy: &mut dyn OverridingStrategy<D>,
) {
    let mut not_overridden: Vec<Rc<D>> = Vec::with_capacity(members_from_supertypes.len());
    for member in members_from_supertypes {
        if !not_overridden.iter().any(|known| Rc::ptr_eq(known, member)) {
            not_overridden.push(Rc::clone(member));
        }
    }
    for from_current in members_from_current {
        let bound = extract_and_bind_overrides_for_member(from_current, &not_overridden, strategy);
        not_overridden.retain(|member| !bound.iter().any(|b| Rc::ptr_eq(b, member)));
    }
    trace!(target: "lzr::override", class = %current.fq_name(), %name, inherited = not_overridden.len(), "binding overrides");
    create_and_bind_fake_overrides(current, not_overridden, strategy);
}

fn extract_and_bind_overrides_for_member<D: CallableMember>(
    from_current: &Rc<D>,
    from_supertypes: &[Rc<D>],
    strategy: &mut dyn OverridingStrategy<D>,
) -> Vec<Rc<D>> {
    let mut bound = Vec::new();
    let mut overridden = Vec::new();
    for from_super in from_supertypes {
        let visible = is_visible_for_override(&**from_super);
        match is_overridable_by(&**from_super, &**from_current) {
            Overridability::Overridable => {
                if visible {
                    overridden.push(Rc::clone(from_super));
                }
                bound.push(Rc::clone(from_super));
            }
            Overridability::Conflict => {
                if visible {
                    strategy.override_conflict(from_super, from_current);
                }
                bound.push(Rc::clone(from_super));
            }
            Overridability::Incompatible => {}
        }
    }
    strategy.set_overridden(from_current, &overridden);
    bound
}

fn create_and_bind_fake_overrides<D: CallableMember>(
    current: &Rc<LazyClassDescriptor>,
    mut queue: Vec<Rc<D>>,
    strategy: &mut dyn OverridingStrategy<D>,
) {
    while let Some(from_super) = find_member_with_max_visibility(&queue) {
        let overridables = extract_members_overridable_in_both_ways(&from_super, &mut queue, strategy);
        create_and_bind_fake_override(&overridables, current, strategy);
    }
}

fn find_member_with_max_visibility<D: CallableMember>(members: &[Rc<D>]) -> Option<Rc<D>> {
    let mut best = members.first()?;
    for member in &members[1..] {
        if member.visibility().compare(best.visibility()) == Some(Ordering::Greater) {
            best = member;
        }
    }
    Some(Rc::clone(best))
}

fn extract_members_overridable_in_both_ways<D: CallableMember>(
    overrider: &Rc<D>,
    queue: &mut Vec<Rc<D>>,
    strategy: &mut dyn OverridingStrategy<D>,
) -> Vec<Rc<D>> {
    let mut overridables = vec![Rc::clone(overrider)];
    queue.retain(|candidate| {
        if Rc::ptr_eq(candidate, overrider) {
            return false;
        }
        match both_ways_overridability(&**overrider, &**candidate) {
            Overridability::Overridable => {
                overridables.push(Rc::clone(candidate));
                false
            }
            Overridability::Conflict => {
                strategy.inheritance_conflict(overrider, candidate);
                false
            }
            Overridability::Incompatible => true,
        }
    });
    overridables
}

fn create_and_bind_fake_override<D: CallableMember>(
    overridables: &[Rc<D>],
    current: &Rc<LazyClassDescriptor>,
    strategy: &mut dyn OverridingStrategy<D>,
) {
    let visible: Vec<Rc<D>> = overridables
        .iter()
        .filter(|member| is_visible_for_override(&***member))
        .cloned()
        .collect();
    if visible.is_empty() {
        // Private members are not inherited.
        return;
    }
    let modality = fake_override_modality(&visible);
    let most_specific = select_most_specific_member(&visible);
    let data = most_specific.member().derived(
        DescriptorOwner::for_class(current),
        CallableKind::FakeOverride,
        modality,
        Visibility::Unknown,
        false,
    );
    let fake_override = Rc::new(most_specific.with_member_data(data));
    strategy.set_overridden(&fake_override, &visible);
    strategy.add_fake_override(fake_override);
}

/// Final if anything inherited is final; otherwise open unless every
/// inherited member is abstract.
pub fn fake_override_modality<D: CallableMember>(overridden: &[Rc<D>]) -> Modality {
    let mut has_open = false;
    let mut has_abstract = false;
    for member in overridden {
        match member.modality() {
            Modality::Final => return Modality::Final,
            Modality::Open => has_open = true,
            Modality::Abstract | Modality::Sealed => has_abstract = true,
        }
    }
    if has_abstract && !has_open {
        Modality::Abstract
    } else {
        Modality::Open
    }
}

/// Prefer an implementation over an abstract declaration.
fn select_most_specific_member<D: CallableMember>(members: &[Rc<D>]) -> &Rc<D> {
    members
        .iter()
        .find(|member| member.modality() != Modality::Abstract)
        .unwrap_or(&members[0])
}

/// Replace an unknown visibility with the one inherited from the overridden
/// members, resolving those first. `cannot_infer` is told about members whose
/// visibility has no single answer; they become public.
pub fn resolve_unknown_visibility_for_member<D: CallableMember>(member: &D, cannot_infer: &mut dyn FnMut(&D)) {
    for overridden in member.overridden() {
        if overridden.visibility() == Visibility::Unknown {
            resolve_unknown_visibility_for_member(&*overridden, cannot_infer);
        }
    }
    if member.visibility() != Visibility::Unknown {
        return;
    }
    let visibility = match visibility_to_inherit(member) {
        Some(visibility) => visibility,
        None => {
            cannot_infer(member);
            Visibility::Public
        }
    };
    debug!(target: "lzr::override", member = %member.describe(), visibility = visibility.keyword(), "visibility inferred");
    member.member().set_visibility(visibility);
}

fn visibility_to_inherit<D: CallableMember>(member: &D) -> Option<Visibility> {
    let overridden = member.overridden();
    let visibilities: Vec<Visibility> = overridden.iter().map(|o| o.visibility()).collect();
    let max = find_max_visibility(&visibilities)?;
    if member.kind() == CallableKind::FakeOverride {
        let consistent = overridden
            .iter()
            .all(|o| o.modality() == Modality::Abstract || o.visibility() == max);
        if !consistent {
            return None;
        }
    }
    Some(max)
}

#[cfg(test)]
#[path = "tests/overriding_tests.rs"]
mod tests;
