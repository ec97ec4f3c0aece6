//! Landing orchestration
//!
//! Drives build, submit and poll in a bounded loop. Each attempt starts from
//! scratch: new blockhash, new ephemeral account, new estimates. An attempt
//! that ends in `NotLanded` or a retryable builder error is followed by a
//! backoff and another attempt until the retry policy runs out.

use crate::confirmation::{ConfirmationPoller, LandingStatus};
use crate::rpc_manager::{LedgerRpc, RetryPolicy};
use crate::structured_logging::StructuredLogger;
use crate::tx_builder::{SubmittedTransaction, TransactionBuilderError, TxBuilder};
use solana_sdk::signature::Signature;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Successful end of a landing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingReport {
    pub signature: Signature,
    pub slot: u64,
    /// On-chain execution error; the transaction landed either way
    pub err: Option<String>,
    /// Attempts used, including the one that landed
    pub attempts: u32,
    pub elapsed: Duration,
    pub submission: SubmittedTransaction,
}

impl LandingReport {
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

/// Why a landing run stopped without a landed transaction
#[derive(Error, Debug)]
pub enum LandingError {
    /// Fatal build or submission failure
    #[error("Attempt {attempt} failed: {source}")]
    Build {
        attempt: u32,
        #[source]
        source: TransactionBuilderError,
    },

    /// Polling failed after submission; the signature may still land
    #[error("Confirmation of {signature} unknown: {reason}")]
    ConfirmationUnknown { signature: Signature, reason: String },

    /// Every attempt ended in a retryable failure
    #[error("Gave up after {attempts} attempts, last error: {last_error}")]
    AttemptsExhausted { attempts: u32, last_error: String },
}

impl LandingError {
    /// Error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            LandingError::Build { source, .. } => source.category(),
            LandingError::ConfirmationUnknown { .. } => "confirmation",
            LandingError::AttemptsExhausted { .. } => "exhausted",
        }
    }
}

/// How one attempt ended short of a terminal error
enum AttemptOutcome {
    Landed(LandingReport),
    Retry(String),
}

/// Builder, poller and retry policy wired together
pub struct Lander<R: LedgerRpc + ?Sized> {
    builder: TxBuilder<R>,
    poller: ConfirmationPoller<R>,
    retry: RetryPolicy,
}

impl<R: LedgerRpc + ?Sized> Lander<R> {
    pub fn new(builder: TxBuilder<R>, poller: ConfirmationPoller<R>, retry: RetryPolicy) -> Self {
        Self {
            builder,
            poller,
            retry,
        }
    }

    /// Run attempts until the transaction lands or the policy gives up
    pub async fn run(&self, logger: &StructuredLogger) -> Result<LandingReport, LandingError> {
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            logger.log_attempt_start(attempt, max_attempts);

            let outcome = match self.builder.build_and_submit(attempt, logger).await {
                Ok(submitted) => self.watch(submitted, started, logger).await?,
                // The node may hold the transaction; wait out its blockhash
                // before building another transfer.
                Err(TransactionBuilderError::SubmissionUncertain { submission, .. }) => {
                    self.watch(*submission, started, logger).await?
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    logger.log_attempt_failure(attempt, e.category(), &e.to_string(), retryable);
                    if !retryable {
                        return Err(LandingError::Build { attempt, source: e });
                    }
                    AttemptOutcome::Retry(e.to_string())
                }
            };
            let last_error = match outcome {
                AttemptOutcome::Landed(report) => return Ok(report),
                AttemptOutcome::Retry(reason) => reason,
            };

            // calculate_delay counts attempts from zero
            match self.retry.calculate_delay(attempt - 1) {
                Some(delay) => {
                    logger.log_backoff(attempt, delay.as_millis() as u64);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    logger.error(&format!("Attempt budget of {} spent", max_attempts));
                    return Err(LandingError::AttemptsExhausted {
                        attempts: attempt,
                        last_error,
                    });
                }
            }
        }
    }

    /// Poll one signed transaction until it lands or its blockhash expires
    async fn watch(
        &self,
        submitted: SubmittedTransaction,
        started: Instant,
        logger: &StructuredLogger,
    ) -> Result<AttemptOutcome, LandingError> {
        let attempt = submitted.attempt;
        match self
            .poller
            .poll(&submitted.signature, &submitted.blockhash, logger)
            .await
        {
            LandingStatus::Landed(landed) => Ok(AttemptOutcome::Landed(LandingReport {
                signature: submitted.signature,
                slot: landed.slot,
                err: landed.err,
                attempts: attempt,
                elapsed: started.elapsed(),
                submission: submitted,
            })),
            LandingStatus::NotLanded => {
                let reason = format!(
                    "blockhash {} expired before {} landed",
                    submitted.blockhash, submitted.signature
                );
                logger.log_attempt_failure(attempt, "not_landed", &reason, true);
                Ok(AttemptOutcome::Retry(reason))
            }
            LandingStatus::Error(reason) => {
                logger.log_attempt_failure(attempt, "confirmation", &reason, false);
                Err(LandingError::ConfirmationUnknown {
                    signature: submitted.signature,
                    reason,
                })
            }
        }
    }
}
