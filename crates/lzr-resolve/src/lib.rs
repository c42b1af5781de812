//! Lazy member-scope resolution.
//!
//! This crate turns declaration nodes into descriptors on demand:
//! - `provider` - raw declarations of one container, by name
//! - `resolver` - the seam that turns a declaration into a descriptor
//! - `member_scope` - memoized per-name queries shared by every scope
//! - `package_scope` / `class_scope` - the two concrete member scopes
//! - `class_descriptor` - lazily resolved classes
//! - `scopes_support` - lexical scopes of the parts of a class
//! - `overriding` - override binding and fake overrides
//! - `synthetic` - plugin hooks for members without source
//! - `lookup` - lookup tracking for incremental builds
//!
//! Nothing is resolved until asked. Re-entrant requests get a fallback
//! instead of looping, and every user-facing problem lands in the
//! [`DiagnosticTrace`] of the session's [`ResolveContext`].

pub mod class_descriptor;
pub mod class_scope;
pub mod context;
pub mod data_class;
pub mod declarations;
mod delegation;
pub mod descriptor_set;
pub mod descriptors;
pub mod error;
pub mod force_resolve;
pub mod functions_from_any;
mod jvm_signatures;
pub mod kind_filter;
pub mod lexical_scope;
pub mod lookup;
pub mod member_scope;
pub mod options;
pub mod overriding;
pub mod package_scope;
pub mod provider;
pub mod resolver;
pub mod scopes_support;
pub mod synthetic;
pub mod trace;
pub mod types;

pub use class_descriptor::{ClassContainer, LazyClassDescriptor};
pub use class_scope::ClassMemberScope;
pub use context::ResolveContext;
pub use declarations::{
    ClassDeclaration, ClassKind, ClassModifiers, ConstructorDeclaration, DeclarationNode,
    DestructuringDeclaration, FunctionDeclaration, MemberModifiers, NodeId, ParameterDeclaration,
    PropertyDeclaration, SourceFile, TypeAliasDeclaration, TypeRef,
};
pub use descriptor_set::DescriptorSet;
pub use descriptors::{
    CallableKind, CallableMember, ClassifierDescriptor, ConstructorDescriptor,
    DeclarationDescriptor, DescriptorOwner, FunctionDescriptor, MemberOrigin, Modality,
    PropertyDescriptor, TypeAliasDescriptor, ValueParameterDescriptor, Visibility,
};
pub use error::{ResolveError, internal_error, run_guarded};
pub use force_resolve::{ForceResolveStats, force_resolve_all_contents, force_resolve_package};
pub use kind_filter::{DescriptorKindFilter, NameFilter};
pub use lexical_scope::{LexicalClassifier, LexicalScope, LexicalScopeKind};
pub use lookup::{
    LookupLocation, LookupRecord, LookupTracker, NoopLookupTracker, RecordingLookupTracker,
    ScopeKind,
};
pub use member_scope::{LazyMemberScope, NameSet};
pub use options::{LanguageFeatures, ResolverOptions};
pub use package_scope::PackageMemberScope;
pub use provider::{
    ClassDeclarationProvider, ClassMemberDeclarationProvider, DeclarationProvider,
    FileDeclarationProvider,
};
pub use resolver::{DefaultDescriptorResolver, DescriptorResolver, ResolvedSupertype};
pub use synthetic::{
    AdditionalClassPartsProvider, CompositeSyntheticResolveExtension, NoAdditionalClassParts,
    NoSyntheticMembers, SyntheticResolveExtension,
};
pub use trace::DiagnosticTrace;
pub use types::{FqName, Type};
