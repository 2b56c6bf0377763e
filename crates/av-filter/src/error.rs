//! Error taxonomy for the filter
//!
//! Every error is fatal: the run aborts and no document is written.

use std::process::ExitStatus;
use thiserror::Error;

/// Filter errors
#[derive(Error, Debug)]
pub enum FilterError {
    /// A leaf is neither a string nor a `!vault` scalar
    #[error("Expected a string or !vault value at {path}; found {value}")]
    UnsupportedLeafType { path: String, value: String },

    /// The document root is a scalar rather than a mapping or sequence
    #[error("Expected a mapping or sequence at the document root; found {kind}")]
    UnsupportedRootType { kind: String },

    /// A mapping key is a collection or carries a tag
    #[error("Mapping keys must be plain scalars; found {kind}")]
    UnsupportedKey { kind: String },

    #[error("ANSIBLE_VAULT_IDENTITY not set and no vaultid given.")]
    MissingIdentity,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {subcommand} failed ({status}): {stderr}")]
    VaultCommand {
        program: String,
        subcommand: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    /// The vault tool succeeded but its output could not be understood
    #[error("Unexpected output from {subcommand}: {reason}")]
    MalformedOutput {
        subcommand: &'static str,
        reason: String,
    },

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to emit YAML: {0}")]
    Emit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
