//! Crypto gateway
//!
//! The actual cryptography belongs to `ansible-vault`. `VaultBackend` runs
//! the tool; `Gateway` turns its raw output into document nodes.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, trace};

use crate::document::{PlainScalar, VaultedScalar};
use crate::error::FilterError;

/// Header line `ansible-vault encrypt_string` prints before the ciphertext
const VAULT_HEADER: &str = "!vault |";

/// Something that can encrypt and decrypt a single vault payload
pub trait VaultBackend {
    /// Decrypt ciphertext, returning the plaintext exactly
    fn decrypt(&self, ciphertext: &str) -> Result<String, FilterError>;

    /// Encrypt plaintext, returning the tool's raw `!vault |` output
    fn encrypt(&self, identity: &str, label: &str, plaintext: &str) -> Result<String, FilterError>;
}

/// Backend that shells out to `ansible-vault`
#[derive(Debug, Clone)]
pub struct AnsibleVault {
    program: PathBuf,
}

impl AnsibleVault {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the tool with `input` on stdin and return its stdout
    fn run(
        &self,
        subcommand: &'static str,
        args: &[&str],
        input: &str,
    ) -> Result<String, FilterError> {
        let program = self.program.display().to_string();
        debug!(%program, subcommand, "Invoking vault tool");

        let mut child = Command::new(&self.program)
            .arg(subcommand)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FilterError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a chatty child cannot deadlock us
        let mut stdin = child.stdin.take().ok_or_else(|| FilterError::Spawn {
            program: program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin unavailable"),
        })?;
        let payload = input.to_owned();
        let writer = thread::spawn(move || stdin.write_all(payload.as_bytes()));

        let output = child.wait_with_output()?;
        // A child that exits without draining stdin reports a broken pipe;
        // its exit status is the more useful error
        let write_result = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

        if !output.status.success() {
            return Err(FilterError::VaultCommand {
                program,
                subcommand,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        write_result?;

        String::from_utf8(output.stdout).map_err(|_| FilterError::MalformedOutput {
            subcommand,
            reason: "output is not valid UTF-8".to_string(),
        })
    }
}

impl VaultBackend for AnsibleVault {
    fn decrypt(&self, ciphertext: &str) -> Result<String, FilterError> {
        self.run("decrypt", &[], ciphertext)
    }

    fn encrypt(&self, identity: &str, label: &str, plaintext: &str) -> Result<String, FilterError> {
        self.run(
            "encrypt_string",
            &["--encrypt-vault-id", identity, "--stdin-name", label],
            plaintext,
        )
    }
}

/// Normalizes backend output into document nodes
pub struct Gateway<B> {
    backend: B,
    identity: Option<String>,
}

impl<B: VaultBackend> Gateway<B> {
    pub fn new(backend: B, identity: Option<String>) -> Self {
        Self { backend, identity }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Decrypt a vaulted value
    ///
    /// A single line without a trailing newline comes back inline; anything
    /// else becomes a literal block whose chomping reproduces the text.
    pub fn decrypt(&self, vaulted: &VaultedScalar) -> Result<PlainScalar, FilterError> {
        let text = self.backend.decrypt(&vaulted.ciphertext)?;
        trace!(bytes = text.len(), "Decrypted value");

        if is_single_line(&text) {
            Ok(PlainScalar::inline(text))
        } else {
            Ok(PlainScalar::literal(text))
        }
    }

    /// Encrypt a plain value under the configured identity
    pub fn encrypt(
        &self,
        plain: &PlainScalar,
        label: Option<&str>,
    ) -> Result<VaultedScalar, FilterError> {
        let identity = self.identity.as_deref().ok_or(FilterError::MissingIdentity)?;
        let raw = self
            .backend
            .encrypt(identity, label.unwrap_or(""), &plain.text)?;
        trace!(bytes = raw.len(), "Encrypted value");

        parse_encrypted(&raw)
    }
}

fn is_single_line(text: &str) -> bool {
    !text.is_empty() && !text.contains(['\n', '\r'])
}

/// Strip the `!vault |` header and re-flow the indented ciphertext lines
fn parse_encrypted(raw: &str) -> Result<VaultedScalar, FilterError> {
    let mut lines = raw.lines();
    let header = lines.next().unwrap_or_default();
    // A non-empty label is printed as `label: !vault |`
    if !header.trim_end().ends_with(VAULT_HEADER) {
        return Err(FilterError::MalformedOutput {
            subcommand: "encrypt_string",
            reason: format!("expected '{}' header", VAULT_HEADER),
        });
    }

    let body: Vec<&str> = lines
        .map(str::trim_start)
        .filter(|line| !line.is_empty())
        .collect();
    if body.is_empty() {
        return Err(FilterError::MalformedOutput {
            subcommand: "encrypt_string",
            reason: "no ciphertext after header".to_string(),
        });
    }

    let mut ciphertext = body.join("\n");
    ciphertext.push('\n');
    Ok(VaultedScalar::new(ciphertext))
}
