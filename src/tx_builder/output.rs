//! Result of a successful build-and-submit

use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};

/// A signed transaction that the node accepted for broadcast
///
/// Carries what the confirmation poller needs (signature and reference
/// blockhash) plus the derived budget values for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    /// Attempt number that produced this submission
    pub attempt: u32,

    /// Signature returned by the node
    pub signature: Signature,

    /// Blockhash the transaction references; its expiry bounds the poll
    pub blockhash: Hash,

    /// Ephemeral account that co-signed the program calls
    pub ephemeral: Pubkey,

    /// Compute-unit limit set at position 0
    pub compute_unit_limit: u32,

    /// Compute-unit price (micro-lamports) set at position 1
    pub compute_unit_price: u64,
}
