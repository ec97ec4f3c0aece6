//! Compute-unit estimation through node-side simulation
//!
//! The simulated transaction carries placeholder signatures; the node is
//! asked to skip signature verification and replace the blockhash.

use crate::rpc_manager::LedgerRpc;
use crate::tx_builder::errors::{RpcStage, TransactionBuilderError};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use tracing::debug;

/// Compile a v0 message for `payer` against `blockhash`
pub fn compile_message(
    payer: &Pubkey,
    instructions: &[Instruction],
    blockhash: Hash,
) -> Result<VersionedMessage, TransactionBuilderError> {
    let message = v0::Message::try_compile(payer, instructions, &[], blockhash)
        .map_err(|e| TransactionBuilderError::Encoding(e.to_string()))?;
    Ok(VersionedMessage::V0(message))
}

/// Build an unsigned transaction shaped like the real one, for simulation
pub fn build_sim_tx(message: VersionedMessage) -> VersionedTransaction {
    let num_signatures = message.header().num_required_signatures as usize;
    VersionedTransaction {
        signatures: vec![Signature::default(); num_signatures],
        message,
    }
}

/// Simulate `instructions` and return the compute units consumed
///
/// # Errors
///
/// - `Rpc { stage: Simulation }` when the call itself fails
/// - `Simulation` when the node reports an execution error or no unit count
pub async fn estimate_compute_units<R: LedgerRpc + ?Sized>(
    rpc: &R,
    payer: &Pubkey,
    instructions: &[Instruction],
    blockhash: Hash,
) -> Result<u64, TransactionBuilderError> {
    let sim_tx = build_sim_tx(compile_message(payer, instructions, blockhash)?);

    let outcome = rpc
        .simulate(&sim_tx)
        .await
        .map_err(|e| TransactionBuilderError::rpc(RpcStage::Simulation, e))?;

    if let Some(err) = outcome.err {
        debug!(error = %err, logs = ?outcome.logs, "Simulation returned an execution error");
        return Err(TransactionBuilderError::simulation_failed(err));
    }

    outcome.units_consumed.ok_or_else(|| {
        TransactionBuilderError::simulation_failed("node did not report units consumed")
    })
}
