//! Error types for lifecycle construction and plugin loading.
//!
//! `LoadError` never escapes a resolution call: the loader and catalog log it
//! once and drop the slot. It exists so the single warning carries a precise
//! cause.

use phasekit_sandbox::SandboxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("plugin not found: {0}")]
    NotFound(String),

    #[error("unsupported plugin spec '{0}' (expected ./relative path or http(s) URL)")]
    Unsupported(String),

    #[error("failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(#[from] SandboxError),

    #[error("compilation of {0} was aborted")]
    Aborted(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("duplicate phase name: {0}")]
    DuplicatePhase(String),

    #[error("phase at position {0} has an empty name")]
    EmptyPhaseName(usize),
}
