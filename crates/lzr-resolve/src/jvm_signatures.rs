//! Platform signature clash detection over a class's full member list.

use crate::class_descriptor::LazyClassDescriptor;
use crate::descriptors::{CallableKind, CallableMember, DeclarationDescriptor, MemberOrigin};
use crate::trace::DiagnosticTrace;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::rc::Rc;

struct Member {
    description: String,
    origin: MemberOrigin,
    descriptor: DeclarationDescriptor,
}

/// Report every platform signature shared by two or more members the class
/// itself contributes, unless they override one another. Fake overrides
/// are left to the classes that declare them.
pub fn report_platform_clashes(
    class: &LazyClassDescriptor,
    descriptors: &[DeclarationDescriptor],
    trace: &DiagnosticTrace,
) {
    let mut groups: IndexMap<String, Vec<Member>, FxBuildHasher> = IndexMap::default();
    for descriptor in descriptors {
        let (signature, member) = match descriptor {
            DeclarationDescriptor::Function(function) => (function.jvm_signature(), member_of(&**function, descriptor)),
            DeclarationDescriptor::Property(property) => (property.jvm_signature(), member_of(&**property, descriptor)),
            DeclarationDescriptor::Class(_) | DeclarationDescriptor::TypeAlias(_) => continue,
        };
        let Some(member) = member else { continue };
        groups.entry(signature).or_default().push(member);
    }

    for (signature, members) in groups {
        let clashing: Vec<&Member> = members
            .iter()
            .filter(|member| !members.iter().any(|other| overrides(&other.descriptor, &member.descriptor)))
            .collect();
        if clashing.len() < 2 {
            continue;
        }
        let origins: Vec<MemberOrigin> = clashing.iter().map(|member| member.origin).collect();
        let descriptions: Vec<String> = clashing.iter().map(|member| member.description.clone()).collect();
        trace.report_jvm_clash(
            class.fq_name(),
            &signature,
            &origins,
            class.declaration().span,
            &descriptions,
        );
    }
}

fn member_of<D: CallableMember>(member: &D, descriptor: &DeclarationDescriptor) -> Option<Member> {
    (member.kind() != CallableKind::FakeOverride).then(|| Member {
        description: member.describe(),
        origin: member.member().origin,
        descriptor: descriptor.clone(),
    })
}

/// Whether `sub` lists `target` among the members it overrides.
fn overrides(sub: &DeclarationDescriptor, target: &DeclarationDescriptor) -> bool {
    match (sub, target) {
        (DeclarationDescriptor::Function(sub), DeclarationDescriptor::Function(target)) => {
            sub.overridden().iter().any(|o| Rc::ptr_eq(o, target))
        }
        (DeclarationDescriptor::Property(sub), DeclarationDescriptor::Property(target)) => {
            sub.overridden().iter().any(|o| Rc::ptr_eq(o, target))
        }
        _ => false,
    }
}
