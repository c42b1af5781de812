//! Filters for `contributed_descriptors`.

use crate::descriptors::DeclarationDescriptor;
use bitflags::bitflags;
use lzr_common::Name;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DescriptorKindFilter: u8 {
        const NON_SINGLETON_CLASSIFIERS = 1 << 0;
        const SINGLETON_CLASSIFIERS     = 1 << 1;
        const TYPE_ALIASES              = 1 << 2;
        const FUNCTIONS                 = 1 << 3;
        const VARIABLES                 = 1 << 4;

        const CLASSIFIERS = Self::NON_SINGLETON_CLASSIFIERS.bits()
            | Self::SINGLETON_CLASSIFIERS.bits()
            | Self::TYPE_ALIASES.bits();
        const CALLABLES = Self::FUNCTIONS.bits() | Self::VARIABLES.bits();
        const ALL = Self::CLASSIFIERS.bits() | Self::CALLABLES.bits();
    }
}

impl DescriptorKindFilter {
    pub fn accepts(self, descriptor: &DeclarationDescriptor) -> bool {
        let kind = match descriptor {
            DeclarationDescriptor::Class(class) if class.kind().is_singleton() => {
                Self::SINGLETON_CLASSIFIERS
            }
            DeclarationDescriptor::Class(_) => Self::NON_SINGLETON_CLASSIFIERS,
            DeclarationDescriptor::TypeAlias(_) => Self::TYPE_ALIASES,
            DeclarationDescriptor::Function(_) => Self::FUNCTIONS,
            DeclarationDescriptor::Property(_) => Self::VARIABLES,
        };
        self.intersects(kind)
    }

    pub fn accepts_classifiers(self) -> bool {
        self.intersects(Self::CLASSIFIERS)
    }
}

/// Name predicate for descriptor listings. `All` lets scopes serve the full
/// cached listing instead of computing a partial one.
#[derive(Clone, Copy)]
pub enum NameFilter<'a> {
    All,
    Matching(&'a dyn Fn(Name) -> bool),
}

impl NameFilter<'_> {
    #[inline]
    pub fn accepts(&self, name: Name) -> bool {
        match self {
            NameFilter::All => true,
            NameFilter::Matching(predicate) => predicate(name),
        }
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        matches!(self, NameFilter::All)
    }
}

impl std::fmt::Debug for NameFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameFilter::All => f.write_str("NameFilter::All"),
            NameFilter::Matching(_) => f.write_str("NameFilter::Matching(..)"),
        }
    }
}

/// Keep the descriptors both filters accept, in order.
pub fn filter_descriptors(
    descriptors: &[DeclarationDescriptor],
    kind_filter: DescriptorKindFilter,
    name_filter: &NameFilter<'_>,
) -> Vec<DeclarationDescriptor> {
    descriptors
        .iter()
        .filter(|descriptor| kind_filter.accepts(descriptor) && name_filter.accepts(descriptor.name()))
        .cloned()
        .collect()
}
