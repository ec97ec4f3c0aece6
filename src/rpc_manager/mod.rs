//! RPC Manager Module
//!
//! The ledger boundary: every network round trip the lander makes goes
//! through [`LedgerRpc`], so the builder and poller can run against the
//! real node ([`SolanaRpc`]) or a synthetic double in tests.

use async_trait::async_trait;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};

// Submodules
pub mod client;
pub mod rpc_errors;

// Re-exports for convenience
pub use client::SolanaRpc;
pub use rpc_errors::{RetryPolicy, RpcManagerError};

/// Result alias for ledger calls
pub type RpcResult<T> = Result<T, RpcManagerError>;

/// A transaction the node returned by signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandedTransaction {
    /// Slot the transaction was included in
    pub slot: u64,
    /// On-chain execution error, if the transaction reverted
    pub err: Option<String>,
}

impl LandedTransaction {
    /// Whether the transaction executed without an on-chain error
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

/// Outcome of a node-side simulation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Compute units consumed, when the node reports them
    pub units_consumed: Option<u64>,
    /// Execution error reported by the simulation
    pub err: Option<String>,
    /// Program logs
    pub logs: Vec<String>,
}

/// Submission flags forwarded to `sendTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Commitment used for the (skipped) preflight check
    pub commitment: CommitmentConfig,
    /// Node-side rebroadcast count; the lander retries on its own
    pub max_retries: usize,
    /// Skip the node's preflight simulation
    pub skip_preflight: bool,
}

impl SendOptions {
    /// Fire-and-forget submission: no node retries, no preflight
    pub fn fire_and_forget(commitment: CommitmentConfig) -> Self {
        Self {
            commitment,
            max_retries: 0,
            skip_preflight: true,
        }
    }
}

/// Ledger RPC surface consumed by the builder and the confirmation poller
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch the latest blockhash at the given commitment
    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> RpcResult<Hash>;

    /// Check whether a blockhash can still be referenced by new transactions
    async fn is_blockhash_valid(
        &self,
        blockhash: &Hash,
        commitment: CommitmentConfig,
    ) -> RpcResult<bool>;

    /// Fetch a transaction by signature; `None` when the node has not seen it
    async fn get_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> RpcResult<Option<LandedTransaction>>;

    /// Simulate a transaction to measure compute-unit consumption
    async fn simulate(&self, transaction: &VersionedTransaction) -> RpcResult<SimulationOutcome>;

    /// Recent per-slot prioritization fees (micro-lamports per CU) for the accounts
    async fn get_recent_prioritization_fees(&self, addresses: &[Pubkey]) -> RpcResult<Vec<u64>>;

    /// Submit a signed transaction and return its signature
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> RpcResult<Signature>;
}
