//! Scripted ledger shared by the integration tests
//!
//! Blockhashes expire after a fixed number of validity checks, and only the
//! configured submission ever lands.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use tx_lander::rpc_manager::{
    LandedTransaction, LedgerRpc, RpcManagerError, RpcResult, SendOptions, SimulationOutcome,
};

#[derive(Default)]
struct LedgerState {
    blockhashes: Vec<Hash>,
    validity_checks: HashMap<Hash, u32>,
    sent: Vec<VersionedTransaction>,
    send_options: Vec<SendOptions>,
    fee_queries: Vec<Vec<Pubkey>>,
}

pub struct ScriptedLedger {
    state: Mutex<LedgerState>,
    /// Validity checks a blockhash answers `true` to before expiring
    pub blockhash_lifetime: u32,
    /// 0-based submission that the ledger includes; `None` means nothing lands
    pub landing_submission: Option<usize>,
    pub on_chain_error: Option<String>,
    pub units_consumed: u64,
    pub fees: Vec<u64>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            blockhash_lifetime: 2,
            landing_submission: Some(0),
            on_chain_error: None,
            units_consumed: 1_000,
            fees: vec![50, 120, 80],
        }
    }

    pub fn landing_on(mut self, submission: Option<usize>) -> Self {
        self.landing_submission = submission;
        self
    }

    pub fn failing_on_chain(mut self, err: &str) -> Self {
        self.on_chain_error = Some(err.to_string());
        self
    }

    pub fn sent(&self) -> Vec<VersionedTransaction> {
        self.state.lock().sent.clone()
    }

    pub fn send_options(&self) -> Vec<SendOptions> {
        self.state.lock().send_options.clone()
    }

    pub fn blockhashes(&self) -> Vec<Hash> {
        self.state.lock().blockhashes.clone()
    }

    pub fn fee_queries(&self) -> Vec<Vec<Pubkey>> {
        self.state.lock().fee_queries.clone()
    }
}

#[async_trait]
impl LedgerRpc for ScriptedLedger {
    async fn get_latest_blockhash(&self, _commitment: CommitmentConfig) -> RpcResult<Hash> {
        let blockhash = Hash::new_unique();
        self.state.lock().blockhashes.push(blockhash);
        Ok(blockhash)
    }

    async fn is_blockhash_valid(
        &self,
        blockhash: &Hash,
        _commitment: CommitmentConfig,
    ) -> RpcResult<bool> {
        let mut state = self.state.lock();
        let checks = state.validity_checks.entry(*blockhash).or_insert(0);
        *checks += 1;
        Ok(*checks <= self.blockhash_lifetime)
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> RpcResult<Option<LandedTransaction>> {
        let state = self.state.lock();
        let index = state
            .sent
            .iter()
            .position(|tx| tx.signatures.first() == Some(signature));
        match index {
            Some(i) if Some(i) == self.landing_submission => Ok(Some(LandedTransaction {
                slot: 42 + i as u64,
                err: self.on_chain_error.clone(),
            })),
            _ => Ok(None),
        }
    }

    async fn simulate(&self, _transaction: &VersionedTransaction) -> RpcResult<SimulationOutcome> {
        Ok(SimulationOutcome {
            units_consumed: Some(self.units_consumed),
            err: None,
            logs: Vec::new(),
        })
    }

    async fn get_recent_prioritization_fees(&self, addresses: &[Pubkey]) -> RpcResult<Vec<u64>> {
        self.state.lock().fee_queries.push(addresses.to_vec());
        Ok(self.fees.clone())
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> RpcResult<Signature> {
        if !transaction.verify_with_results().iter().all(|ok| *ok) {
            return Err(RpcManagerError::Fatal("signature verification failed".to_string()));
        }
        let mut state = self.state.lock();
        state.sent.push(transaction.clone());
        state.send_options.push(options);
        Ok(transaction.signatures[0])
    }
}
