//! Test Utilities Module
//!
//! A scripted in-memory ledger for exercising the builder, the confirmation
//! poller and the lander without a node. All behaviour is deterministic and
//! every call is recorded for assertions.

#![cfg(test)]

use crate::rpc_manager::{
    LandedTransaction, LedgerRpc, RpcManagerError, RpcResult, SendOptions, SimulationOutcome,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

#[derive(Default)]
struct MockState {
    blockhash_errors: VecDeque<RpcManagerError>,
    validity_script: VecDeque<bool>,
    transaction_errors: VecDeque<RpcManagerError>,
    send_timeouts: usize,
    issued_blockhashes: Vec<Hash>,
    sent: Vec<VersionedTransaction>,
    send_options: Vec<SendOptions>,
    lookups: HashMap<Signature, u32>,
    fee_lookups: Vec<Pubkey>,
    simulate_calls: usize,
    validity_calls: usize,
    transaction_calls: usize,
}

/// Scripted `LedgerRpc` double
pub struct MockLedgerRpc {
    state: Mutex<MockState>,
    units_consumed: Option<u64>,
    simulation_error: Option<String>,
    prioritization_fees: Vec<u64>,
    /// Index of the first submission the ledger will ever include
    land_from_submission: usize,
    /// Lookup number (1-based) on which an includable transaction shows up
    visible_on_lookup: u32,
    landed_error: Option<String>,
    default_validity: bool,
    lookup_latency: Duration,
}

impl MockLedgerRpc {
    /// Ledger that includes every submission and reports it on first lookup
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            units_consumed: Some(1_000),
            simulation_error: None,
            prioritization_fees: Vec::new(),
            land_from_submission: 0,
            visible_on_lookup: 1,
            landed_error: None,
            default_validity: true,
            lookup_latency: Duration::ZERO,
        }
    }

    pub fn with_units_consumed(mut self, units: u64) -> Self {
        self.units_consumed = Some(units);
        self
    }

    pub fn without_units_consumed(mut self) -> Self {
        self.units_consumed = None;
        self
    }

    pub fn with_simulation_error(mut self, err: &str) -> Self {
        self.simulation_error = Some(err.to_string());
        self
    }

    pub fn with_prioritization_fees(mut self, fees: Vec<u64>) -> Self {
        self.prioritization_fees = fees;
        self
    }

    /// Fail the next `get_latest_blockhash` call with `err`
    pub fn with_blockhash_error(self, err: RpcManagerError) -> Self {
        self.state.lock().blockhash_errors.push_back(err);
        self
    }

    /// Answers for successive `is_blockhash_valid` calls
    pub fn with_blockhash_validity(self, script: Vec<bool>) -> Self {
        self.state.lock().validity_script = script.into();
        self
    }

    /// Answer once the validity script is exhausted
    pub fn with_default_validity(mut self, valid: bool) -> Self {
        self.default_validity = valid;
        self
    }

    /// Fail the next `count` `get_transaction` calls with a transport error
    pub fn with_transaction_errors(self, count: usize) -> Self {
        {
            let mut state = self.state.lock();
            for _ in 0..count {
                state.transaction_errors.push_back(RpcManagerError::Transport {
                    endpoint: "mock".to_string(),
                    message: "connection reset".to_string(),
                });
            }
        }
        self
    }

    /// Accept the next `count` submissions but answer them with a timeout
    pub fn with_send_timeouts(self, count: usize) -> Self {
        self.state.lock().send_timeouts = count;
        self
    }

    /// Submissions before `index` (0-based) are never included
    pub fn land_from_submission(mut self, index: usize) -> Self {
        self.land_from_submission = index;
        self
    }

    /// Make includable transactions appear only on the `lookup`-th query
    pub fn visible_on_lookup(mut self, lookup: u32) -> Self {
        self.visible_on_lookup = lookup;
        self
    }

    /// Delay every `get_transaction` answer by `latency`
    pub fn with_lookup_latency(mut self, latency: Duration) -> Self {
        self.lookup_latency = latency;
        self
    }

    /// Report landed transactions with an on-chain error
    pub fn with_landed_error(mut self, err: &str) -> Self {
        self.landed_error = Some(err.to_string());
        self
    }

    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        self.state.lock().sent.clone()
    }

    pub fn last_send_options(&self) -> Option<SendOptions> {
        self.state.lock().send_options.last().copied()
    }

    pub fn issued_blockhashes(&self) -> Vec<Hash> {
        self.state.lock().issued_blockhashes.clone()
    }

    pub fn fee_lookup_addresses(&self) -> Vec<Pubkey> {
        self.state.lock().fee_lookups.clone()
    }

    pub fn simulate_calls(&self) -> usize {
        self.state.lock().simulate_calls
    }

    pub fn validity_calls(&self) -> usize {
        self.state.lock().validity_calls
    }

    pub fn transaction_calls(&self) -> usize {
        self.state.lock().transaction_calls
    }
}

impl Default for MockLedgerRpc {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRpc for MockLedgerRpc {
    async fn get_latest_blockhash(&self, _commitment: CommitmentConfig) -> RpcResult<Hash> {
        let mut state = self.state.lock();
        if let Some(err) = state.blockhash_errors.pop_front() {
            return Err(err);
        }
        let blockhash = Hash::new_unique();
        state.issued_blockhashes.push(blockhash);
        Ok(blockhash)
    }

    async fn is_blockhash_valid(
        &self,
        _blockhash: &Hash,
        _commitment: CommitmentConfig,
    ) -> RpcResult<bool> {
        let mut state = self.state.lock();
        state.validity_calls += 1;
        Ok(state
            .validity_script
            .pop_front()
            .unwrap_or(self.default_validity))
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> RpcResult<Option<LandedTransaction>> {
        if !self.lookup_latency.is_zero() {
            tokio::time::sleep(self.lookup_latency).await;
        }
        let mut state = self.state.lock();
        state.transaction_calls += 1;
        if let Some(err) = state.transaction_errors.pop_front() {
            return Err(err);
        }

        let Some(index) = state
            .sent
            .iter()
            .position(|tx| tx.signatures.first() == Some(signature))
        else {
            return Ok(None);
        };
        if index < self.land_from_submission {
            return Ok(None);
        }

        let lookups = state.lookups.entry(*signature).or_insert(0);
        *lookups += 1;
        if *lookups < self.visible_on_lookup {
            return Ok(None);
        }

        Ok(Some(LandedTransaction {
            slot: 1_000 + index as u64,
            err: self.landed_error.clone(),
        }))
    }

    async fn simulate(&self, _transaction: &VersionedTransaction) -> RpcResult<SimulationOutcome> {
        self.state.lock().simulate_calls += 1;
        Ok(SimulationOutcome {
            units_consumed: self.units_consumed,
            err: self.simulation_error.clone(),
            logs: vec!["Program log: mock".to_string()],
        })
    }

    async fn get_recent_prioritization_fees(&self, addresses: &[Pubkey]) -> RpcResult<Vec<u64>> {
        self.state.lock().fee_lookups.extend_from_slice(addresses);
        Ok(self.prioritization_fees.clone())
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> RpcResult<Signature> {
        let mut state = self.state.lock();
        let signature = transaction.signatures.first().copied().ok_or_else(|| {
            RpcManagerError::Fatal("transaction has no signatures".to_string())
        })?;
        state.sent.push(transaction.clone());
        state.send_options.push(options);
        if state.send_timeouts > 0 {
            state.send_timeouts -= 1;
            return Err(RpcManagerError::Timeout {
                endpoint: "mock".to_string(),
            });
        }
        Ok(signature)
    }
}
