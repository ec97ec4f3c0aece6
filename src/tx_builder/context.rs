//! Per-attempt execution context
//!
//! Everything that must be fresh on each landing attempt lives here: the
//! blockhash fetched for this attempt and the ephemeral account key-pair.
//! A context is consumed by the build and never carried into a retry.

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

/// Execution context for one build-and-submit attempt
///
/// # Lifecycle
///
/// 1. Created by [`AttemptContext::new`] with a freshly fetched blockhash and
///    a newly generated ephemeral key-pair
/// 2. Used to build, simulate and sign the transaction
/// 3. Dropped at the end of the attempt; the ephemeral secret never outlives it
///
/// The Debug implementation prints the ephemeral public key only.
pub struct AttemptContext {
    /// The blockhash the transaction is built against
    pub blockhash: Hash,

    /// Co-signer for the two program calls, unique to this attempt
    pub ephemeral: Keypair,
}

impl std::fmt::Debug for AttemptContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptContext")
            .field("blockhash", &self.blockhash)
            .field("ephemeral", &self.ephemeral.pubkey())
            .finish()
    }
}

impl AttemptContext {
    /// Create a context with a newly generated ephemeral account
    pub fn new(blockhash: Hash) -> Self {
        Self {
            blockhash,
            ephemeral: Keypair::new(),
        }
    }

    /// Public key of the ephemeral account
    pub fn ephemeral_pubkey(&self) -> Pubkey {
        self.ephemeral.pubkey()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_context_has_fresh_ephemeral() {
        let blockhash = Hash::new_unique();
        let first = AttemptContext::new(blockhash);
        let second = AttemptContext::new(blockhash);

        assert_ne!(first.ephemeral_pubkey(), second.ephemeral_pubkey());
        assert_eq!(first.blockhash, second.blockhash);
    }

    #[test]
    fn test_debug_hides_secret() {
        let ctx = AttemptContext::new(Hash::new_unique());
        let rendered = format!("{:?}", ctx);

        assert!(rendered.contains(&ctx.ephemeral_pubkey().to_string()));
        assert!(!rendered.contains(&ctx.ephemeral.to_base58_string()));
    }
}
