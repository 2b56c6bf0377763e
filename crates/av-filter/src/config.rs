//! Filter configuration
//!
//! Sources, highest precedence first:
//! - positional `VAULTID` argument
//! - `ANSIBLE_VAULT_IDENTITY` environment variable
//!
//! ansible.cfg is never consulted for the identity.

use std::path::PathBuf;

/// Environment variable holding the default encryption identity
pub const IDENTITY_ENV: &str = "ANSIBLE_VAULT_IDENTITY";

/// Environment variable overriding the vault program
pub const PROGRAM_ENV: &str = "AV_FILTER_VAULT_PROGRAM";

pub const DEFAULT_VAULT_PROGRAM: &str = "ansible-vault";

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Vault identity used for encryption, if any
    pub identity: Option<String>,
    /// Program invoked for encrypt/decrypt
    pub vault_program: PathBuf,
}

impl Config {
    /// Resolve against the process environment
    pub fn resolve(cli_identity: Option<String>) -> Self {
        Self::from_sources(cli_identity, |name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup
    pub fn from_sources<F>(cli_identity: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let identity = non_empty(cli_identity).or_else(|| non_empty(lookup(IDENTITY_ENV)));
        let vault_program = non_empty(lookup(PROGRAM_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VAULT_PROGRAM));

        Self {
            identity,
            vault_program,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = Config::from_sources(
            Some("prod@prompt".to_string()),
            lookup(&[(IDENTITY_ENV, "dev@~/.vault")]),
        );
        assert_eq!(config.identity.as_deref(), Some("prod@prompt"));
    }

    #[test]
    fn test_env_identity_fallback() {
        let config = Config::from_sources(None, lookup(&[(IDENTITY_ENV, "dev@~/.vault")]));
        assert_eq!(config.identity.as_deref(), Some("dev@~/.vault"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = Config::from_sources(Some(String::new()), lookup(&[(IDENTITY_ENV, "")]));
        assert_eq!(config.identity, None);
    }

    #[test]
    fn test_vault_program() {
        let config = Config::from_sources(None, lookup(&[]));
        assert_eq!(config.vault_program, PathBuf::from("ansible-vault"));

        let program = "/opt/ansible/bin/ansible-vault";
        let config = Config::from_sources(None, lookup(&[(PROGRAM_ENV, program)]));
        assert_eq!(config.vault_program, PathBuf::from(program));
    }
}
