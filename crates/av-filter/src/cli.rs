//! Command-line surface

use clap::{ArgAction, Parser};

/// Filter for stdin to encrypt or decrypt YAML values with ansible-vault
#[derive(Parser, Debug)]
#[command(name = "av-filter")]
#[command(version)]
#[command(about = "Filter for stdin to encrypt or decrypt YAML values with ansible-vault")]
#[command(after_help = r#"BEHAVIOR:
    Plain string values are vaulted, !vault values are unvaulted.
    Reads one YAML document on stdin; writes it to stdout with the
    leading indentation of the first input line.

COMMENTS:
    Comments in the input are not preserved in the output.

ENVIRONMENT:
    ANSIBLE_VAULT_IDENTITY     Default vault identity for encryption
    AV_FILTER_VAULT_PROGRAM    ansible-vault executable to run
    RUST_LOG                   Log filter when no -v is given"#)]
pub struct Cli {
    /// Encryption vault identity - overrides ANSIBLE_VAULT_IDENTITY
    pub vaultid: Option<String>,

    /// Increase display of internal workings (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter directive for the requested verbosity, if any
    pub fn log_directive(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
