//! Wallet management module

use anyhow::{Context, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Holds the fee payer and transfer source for one run
#[derive(Clone)]
pub struct WalletManager {
    keypair: Arc<Keypair>,
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}

impl WalletManager {
    /// Load from a keypair file path, or from a base58 secret when no such
    /// file exists
    pub fn load(source: &str) -> Result<Self> {
        let path = expand_home(source);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Self::from_base58(source)
                .with_context(|| format!("{} is neither a keypair file nor a base58 secret", source))
        }
    }

    /// Load a Solana CLI JSON keypair or a raw 64-byte keypair file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let keypair_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;

        let secret = if keypair_bytes.len() == 64 {
            keypair_bytes
        } else {
            serde_json::from_slice::<Vec<u8>>(&keypair_bytes)
                .context("Failed to parse keypair JSON")?
        };
        Self::from_secret_bytes(&secret)
    }

    /// Load a base58-encoded 64-byte secret key
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let secret = bs58::decode(encoded.trim())
            .into_vec()
            .context("Invalid base58 secret key")?;
        Self::from_secret_bytes(&secret)
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    fn from_secret_bytes(secret: &[u8]) -> Result<Self> {
        if secret.len() != 64 {
            anyhow::bail!("Invalid keypair length: expected 64 bytes, got {}", secret.len());
        }
        if secret.iter().all(|&b| b == 0) {
            anyhow::bail!("Invalid keypair: all-zero key rejected");
        }
        let keypair = Keypair::try_from(secret).context("Invalid keypair bytes")?;
        Ok(Self::from_keypair(keypair))
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Shared handle for the transaction builder
    pub fn keypair_arc(&self) -> Arc<Keypair> {
        Arc::clone(&self.keypair)
    }
}

fn expand_home(source: &str) -> PathBuf {
    match source.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(source),
        },
        None => PathBuf::from(source),
    }
}
