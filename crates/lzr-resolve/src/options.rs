//! Resolver configuration.

use crate::error::ResolveError;
use serde::{Deserialize, Serialize};

/// Language feature switches that change which members are synthesized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageFeatures {
    /// Data classes get `equals`/`hashCode`/`toString` unless declared or
    /// final in a supertype.
    pub data_class_inheritance: bool,
    /// `copy` of a data class takes the primary constructor's visibility.
    pub copy_respects_constructor_visibility: bool,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        LanguageFeatures {
            data_class_inheritance: true,
            copy_respects_constructor_visibility: false,
        }
    }
}

/// Options for one resolution session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    pub report_conflicting_overloads: bool,
    pub report_inheritance_conflicts: bool,
    pub report_jvm_signature_clashes: bool,
    pub language_features: LanguageFeatures,
    /// Bound on superclass chain walks.
    pub max_hierarchy_depth: u32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            report_conflicting_overloads: true,
            report_inheritance_conflicts: true,
            report_jvm_signature_clashes: true,
            language_features: LanguageFeatures::default(),
            max_hierarchy_depth: 256,
        }
    }
}

impl ResolverOptions {
    /// Every report enabled.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// No conflict reports; members are still generated the same way.
    #[must_use]
    pub fn permissive() -> Self {
        ResolverOptions {
            report_conflicting_overloads: false,
            report_inheritance_conflicts: false,
            report_jvm_signature_clashes: false,
            ..Self::default()
        }
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ResolveError> {
        let options: ResolverOptions = serde_json::from_str(text)?;
        if options.max_hierarchy_depth == 0 {
            return Err(ResolveError::InvalidOptions(
                "maxHierarchyDepth must be positive".to_string(),
            ));
        }
        Ok(options)
    }
}
