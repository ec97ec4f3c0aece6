//! tx-lander: lands one Solana transaction against a remote RPC node
//!
//! Builds the transaction, sizes its compute budget and priority fee from
//! the node, submits it without preflight, polls until it lands or its
//! blockhash expires, and retries with a fresh blockhash when it does not.

pub mod compat;
pub mod config;
pub mod confirmation;
pub mod lander;
pub mod observability;
pub mod rpc_manager;
pub mod structured_logging;
pub mod tx_builder;
pub mod wallet;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use confirmation::{ConfirmationPoller, LandingStatus};
pub use lander::{Lander, LandingError, LandingReport};
pub use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};
