//! Internal-consistency failures and the compilation-unit guard.
//!
//! User mistakes never end up here; they are diagnostics in the trace. A
//! [`ResolveError`] means an upstream collaborator broke its contract (a
//! provider handing out a node kind no scope can hold, a constructor whose
//! parameter list disagrees with its declaration). Such failures abort the
//! current resolution via [`internal_error`] and are turned back into a value
//! at the compilation-unit boundary by [`run_guarded`].

use crate::declarations::NodeId;
use std::panic::{AssertUnwindSafe, catch_unwind, panic_any, resume_unwind};
use thiserror::Error;
use tracing::error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "Primary constructor of '{class}' has {from_descriptor} value parameters but {from_declaration} declared parameters"
    )]
    ParameterCountMismatch {
        class: String,
        from_descriptor: usize,
        from_declaration: usize,
    },

    #[error("Unsupported declaration kind '{kind}' (node {node:?}) in member scope of '{owner}'")]
    UnsupportedDeclaration {
        kind: &'static str,
        node: NodeId,
        owner: String,
    },

    #[error("Scope invalidated while still in use: {0}")]
    ScopeInvalidated(String),

    #[error("Invalid resolver options: {0}")]
    InvalidOptions(String),

    #[error("Resolution canceled")]
    Canceled,
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::InvalidOptions(err.to_string())
    }
}

impl From<lzr_storage::Canceled> for ResolveError {
    fn from(_: lzr_storage::Canceled) -> Self {
        ResolveError::Canceled
    }
}

/// Abort the current resolution with an internal-consistency failure.
pub fn internal_error(err: ResolveError) -> ! {
    error!(target: "lzr::scope", error = %err, "internal consistency failure");
    panic_any(err)
}

/// Run one compilation unit's resolution, converting an [`internal_error`]
/// abort into `Err`. Panics of any other kind keep unwinding.
pub fn run_guarded<T>(unit: impl FnOnce() -> T) -> Result<T, ResolveError> {
    match catch_unwind(AssertUnwindSafe(unit)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<ResolveError>() {
            Ok(err) => Err(*err),
            Err(other) => resume_unwind(other),
        },
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
