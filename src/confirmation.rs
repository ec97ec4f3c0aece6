//! Confirmation polling
//!
//! Watches one submitted signature until the node either returns the
//! transaction or reports that its reference blockhash can no longer be used.

use crate::rpc_manager::{LandedTransaction, LedgerRpc};
use crate::structured_logging::StructuredLogger;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash, signature::Signature};
use std::sync::Arc;
use std::time::Duration;

/// Default delay between two poll ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of failing ticks in a row tolerated before giving up
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Definitive outcome of watching one signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingStatus {
    /// The node returned the transaction. It may still carry an on-chain
    /// error; inclusion is what counts.
    Landed(LandedTransaction),
    /// The reference blockhash expired without the transaction showing up
    NotLanded,
    /// The node could not be queried; the transaction may or may not land
    Error(String),
}

impl LandingStatus {
    pub fn is_landed(&self) -> bool {
        matches!(self, LandingStatus::Landed(_))
    }
}

/// Polls the ledger for one signature at a fixed interval
pub struct ConfirmationPoller<R: LedgerRpc + ?Sized> {
    rpc: Arc<R>,
    commitment: CommitmentConfig,
    poll_interval: Duration,
    max_consecutive_errors: u32,
}

impl<R: LedgerRpc + ?Sized> ConfirmationPoller<R> {
    pub fn new(rpc: Arc<R>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc,
            commitment,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Clamped to at least one failing tick
    pub fn with_max_consecutive_errors(mut self, max_consecutive_errors: u32) -> Self {
        self.max_consecutive_errors = max_consecutive_errors.max(1);
        self
    }

    /// Poll until `signature` lands or `blockhash` expires
    ///
    /// The first tick runs immediately; each later tick starts one poll
    /// interval after the previous tick finished. A found transaction wins
    /// over an expired blockhash observed in the same tick. While both checks
    /// stay pending this never returns, so callers wanting a deadline wrap it
    /// in `tokio::time::timeout`.
    pub async fn poll(
        &self,
        signature: &Signature,
        blockhash: &Hash,
        logger: &StructuredLogger,
    ) -> LandingStatus {
        let mut tick: u32 = 0;
        let mut consecutive_errors: u32 = 0;

        loop {
            tick += 1;

            let validity = self.rpc.is_blockhash_valid(blockhash, self.commitment).await;
            let lookup = self.rpc.get_transaction(signature, self.commitment).await;

            match (lookup, validity) {
                (Ok(Some(landed)), _) => {
                    logger.log_landed(signature, &landed, tick);
                    return LandingStatus::Landed(landed);
                }
                (Ok(None), Ok(false)) => {
                    logger.log_not_landed(signature, blockhash, tick);
                    return LandingStatus::NotLanded;
                }
                (Ok(None), Ok(true)) => {
                    logger.log_poll_tick(signature, tick, true);
                    consecutive_errors = 0;
                }
                (Err(error), _) | (Ok(None), Err(error)) => {
                    consecutive_errors += 1;
                    logger.log_poll_error(signature, tick, &error.to_string());
                    if consecutive_errors >= self.max_consecutive_errors {
                        return LandingStatus::Error(format!(
                            "{} consecutive poll failures, last: {}",
                            consecutive_errors, error
                        ));
                    }
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
