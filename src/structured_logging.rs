//! Structured logging for the landing lifecycle

use crate::rpc_manager::LandedTransaction;
use solana_sdk::{hash::Hash, signature::Signature};

/// Structured logger for landing events
///
/// Every event carries the run's `context_id` so the lines of one landing
/// run can be grouped even when several runs share a log sink.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context_id: String,
}

impl StructuredLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::info!(
            context_id = %self.context_id,
            attempt = %attempt,
            max_attempts = %max_attempts,
            "Starting landing attempt"
        );
    }

    pub fn log_compute_budget(&self, simulated_cu: u64, cu_limit: u32, fee_samples: usize, cu_price: u64) {
        tracing::info!(
            context_id = %self.context_id,
            simulated_cu = %simulated_cu,
            cu_limit = %cu_limit,
            fee_samples = %fee_samples,
            cu_price = %cu_price,
            "Compute budget computed"
        );
    }

    pub fn log_submitted(&self, attempt: u32, signature: &Signature, blockhash: &Hash) {
        tracing::info!(
            context_id = %self.context_id,
            attempt = %attempt,
            signature = %signature,
            blockhash = %blockhash,
            "Transaction submitted"
        );
    }

    pub fn log_submission_uncertain(&self, attempt: u32, signature: &Signature, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            attempt = %attempt,
            signature = %signature,
            error = %error,
            "Submission outcome unknown, watching local signature"
        );
    }

    pub fn log_poll_tick(&self, signature: &Signature, tick: u32, blockhash_valid: bool) {
        tracing::info!(
            context_id = %self.context_id,
            signature = %signature,
            tick = %tick,
            blockhash_valid = %blockhash_valid,
            "Polling for confirmation"
        );
    }

    pub fn log_poll_error(&self, signature: &Signature, tick: u32, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            signature = %signature,
            tick = %tick,
            error = %error,
            "Confirmation poll failed"
        );
    }

    pub fn log_landed(&self, signature: &Signature, landed: &LandedTransaction, ticks: u32) {
        match &landed.err {
            None => tracing::info!(
                context_id = %self.context_id,
                signature = %signature,
                slot = %landed.slot,
                ticks = %ticks,
                "Transaction landed"
            ),
            Some(err) => tracing::warn!(
                context_id = %self.context_id,
                signature = %signature,
                slot = %landed.slot,
                ticks = %ticks,
                error = %err,
                "Transaction landed with on-chain failure"
            ),
        }
    }

    pub fn log_not_landed(&self, signature: &Signature, blockhash: &Hash, ticks: u32) {
        tracing::warn!(
            context_id = %self.context_id,
            signature = %signature,
            blockhash = %blockhash,
            ticks = %ticks,
            "Blockhash expired before the transaction landed"
        );
    }

    pub fn log_attempt_failure(&self, attempt: u32, category: &str, error: &str, retryable: bool) {
        tracing::warn!(
            context_id = %self.context_id,
            attempt = %attempt,
            category = %category,
            error = %error,
            retryable = %retryable,
            "Landing attempt failed"
        );
    }

    pub fn log_backoff(&self, attempt: u32, delay_ms: u64) {
        tracing::debug!(
            context_id = %self.context_id,
            attempt = %attempt,
            delay_ms = %delay_ms,
            "Backing off before next attempt"
        );
    }

    pub fn error(&self, message: &str) {
        tracing::error!(
            context_id = %self.context_id,
            message = %message,
            "Error"
        );
    }
}
