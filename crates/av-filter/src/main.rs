//! av-filter - vault and unvault YAML data values
//!
//! Reads one YAML document on stdin. Plain string values come out as
//! `!vault` scalars, `!vault` scalars come out as plain strings.
//!
//! Usage:
//!   av-filter [-v...] [VAULTID] < vars.yml

use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use av_filter::cli::Cli;
use av_filter::{AnsibleVault, Config, Gateway};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the document
    let filter = match cli.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(cli.vaultid);

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read YAML from stdin")?;

    let gateway = Gateway::new(AnsibleVault::new(config.vault_program), config.identity);
    let output = av_filter::run(&input, &gateway)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write YAML to stdout")?;

    Ok(())
}
