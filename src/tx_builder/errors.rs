//! Error types for the transaction builder
//!
//! Every stage of build-and-submit reports through [`TransactionBuilderError`].
//! The lander uses [`TransactionBuilderError::is_retryable`] to decide between
//! starting a fresh attempt and giving up.

use crate::rpc_manager::RpcManagerError;
use crate::tx_builder::output::SubmittedTransaction;
use thiserror::Error;

/// Pipeline stage that issued a failing RPC call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStage {
    Blockhash,
    Simulation,
    PriorityFees,
    Submission,
}

impl std::fmt::Display for RpcStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RpcStage::Blockhash => "blockhash fetch",
            RpcStage::Simulation => "simulation",
            RpcStage::PriorityFees => "priority fee lookup",
            RpcStage::Submission => "submission",
        };
        f.write_str(name)
    }
}

/// Error type for all transaction builder operations
#[derive(Error, Debug)]
pub enum TransactionBuilderError {
    /// An RPC call failed; retryability follows the underlying error
    #[error("RPC error during {stage}: {source}")]
    Rpc {
        stage: RpcStage,
        #[source]
        source: RpcManagerError,
    },

    /// Submission got no definitive answer from the node
    ///
    /// The signed transaction may have been accepted. It has to be watched
    /// until its blockhash expires before another transfer is built.
    #[error("Submission of {} unconfirmed: {source}", .submission.signature)]
    SubmissionUncertain {
        submission: Box<SubmittedTransaction>,
        #[source]
        source: RpcManagerError,
    },

    /// Transaction simulation reported an execution failure
    ///
    /// This usually means the transaction would fail on-chain too
    /// (bad accounts, program error, insufficient balance).
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// Message could not be compiled or serialized
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Failed to sign the transaction, or a required signature is missing
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Budget instructions are not at the front of the instruction list
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// Configuration or validation error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// Simulation errors that depend on network state rather than the transaction itself
const TRANSIENT_SIMULATION_PATTERNS: &[&str] = &["BlockhashNotFound", "AccountInUse", "WouldExceed"];

impl TransactionBuilderError {
    /// Check if a fresh attempt might succeed
    ///
    /// Network-transient failures are retryable; encoding, signing, ordering
    /// and configuration failures are fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc { source, .. } => source.is_retryable(),
            Self::SubmissionUncertain { .. } => false,
            Self::Simulation(msg) => TRANSIENT_SIMULATION_PATTERNS
                .iter()
                .any(|pattern| msg.contains(pattern)),

            Self::Encoding(_) => false,
            Self::Signing(_) => false,
            Self::InvalidInstructionOrder(_) => false,
            Self::Configuration(_) => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Rpc { .. } => "rpc",
            Self::SubmissionUncertain { .. } => "submission",
            Self::Simulation(_) => "simulation",
            Self::Encoding(_) => "encoding",
            Self::Signing(_) => "signing",
            Self::InvalidInstructionOrder(_) => "validation",
            Self::Configuration(_) => "config",
        }
    }
}

// Convenience constructors for common error scenarios
impl TransactionBuilderError {
    /// Wrap an RPC failure with the stage that issued it
    pub fn rpc(stage: RpcStage, source: RpcManagerError) -> Self {
        Self::Rpc { stage, source }
    }

    /// Create a simulation failure error
    pub fn simulation_failed(reason: impl Into<String>) -> Self {
        Self::Simulation(reason.into())
    }

    /// Create an invalid instruction order error
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }
}
