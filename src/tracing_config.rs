//! Tracing configuration for debugging resolution.
//!
//! Supports three output formats controlled by `LZR_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Why did this member come out as a fake override?
//! LZR_LOG="lzr::override=trace" LZR_LOG_FORMAT=tree cargo test -p lzr-resolve
//!
//! # Recursion fallbacks and scope construction
//! LZR_LOG="lzr::storage=debug,lzr::support=debug" cargo bench
//!
//! # JSON for tooling
//! LZR_LOG=debug LZR_LOG_FORMAT=json cargo test
//! ```
//!
//! The subscriber is only initialised when `LZR_LOG` (or `RUST_LOG`) is set.
//! Targets: `lzr::storage`, `lzr::scope`, `lzr::support`, `lzr::override`,
//! `lzr::lookup`, `lzr::unit`, `lzr::interner`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Standard flat text lines.
    #[default]
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Unknown values fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Format named by `LZR_LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LZR_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `LZR_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("LZR_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `LZR_LOG` nor `RUST_LOG` is set. Returns whether
/// a subscriber was installed; a second call (or one after another
/// subscriber was set) returns `false`.
///
/// All output goes to stderr.
pub fn init_tracing() -> bool {
    let has_lzr_log = std::env::var("LZR_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_lzr_log && !has_rust_log {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tests;
