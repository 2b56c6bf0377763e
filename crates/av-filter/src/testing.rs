//! In-memory vault for tests

use std::cell::RefCell;

use crate::error::FilterError;
use crate::gateway::VaultBackend;

const PREFIX: &str = "$MEMORY_VAULT;";

/// Reversible backend: each encryption stores the plaintext and hands back
/// its index as ciphertext
#[derive(Default)]
pub struct MemoryVault {
    plaintexts: RefCell<Vec<String>>,
    decrypts: RefCell<usize>,
}

impl MemoryVault {
    pub fn encryptions(&self) -> usize {
        self.plaintexts.borrow().len()
    }

    pub fn decryptions(&self) -> usize {
        *self.decrypts.borrow()
    }
}

impl VaultBackend for MemoryVault {
    fn decrypt(&self, ciphertext: &str) -> Result<String, FilterError> {
        *self.decrypts.borrow_mut() += 1;
        let index = ciphertext
            .trim()
            .strip_prefix(PREFIX)
            .and_then(|i| i.parse::<usize>().ok())
            .ok_or_else(|| FilterError::MalformedOutput {
                subcommand: "decrypt",
                reason: format!("unknown ciphertext {:?}", ciphertext),
            })?;
        self.plaintexts
            .borrow()
            .get(index)
            .cloned()
            .ok_or_else(|| FilterError::MalformedOutput {
                subcommand: "decrypt",
                reason: format!("no plaintext {}", index),
            })
    }

    fn encrypt(
        &self,
        _identity: &str,
        _label: &str,
        plaintext: &str,
    ) -> Result<String, FilterError> {
        let mut plaintexts = self.plaintexts.borrow_mut();
        plaintexts.push(plaintext.to_string());
        Ok(format!("!vault |\n          {}{}\n", PREFIX, plaintexts.len() - 1))
    }
}
