//! av-filter - vault and unvault YAML data values
//!
//! "Vault the values, keep the file."
//!
//! Pass lines of YAML through the filter: plain string values come out
//! encrypted as `!vault` scalars, already-vaulted values come out as plain
//! strings again. Ansible vars files stay readable and diffable without
//! vaulting whole files.
//!
//! Encryption and decryption are delegated to `ansible-vault`.

pub mod classify;
pub mod cli;
pub mod config;
pub mod document;
pub mod driver;
pub mod error;
pub mod format;
pub mod gateway;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use document::{Chomping, Document, Node, PlainScalar, VaultedScalar};
pub use driver::run;
pub use error::FilterError;
pub use gateway::{AnsibleVault, Gateway, VaultBackend};
