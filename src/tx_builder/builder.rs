//! Core TxBuilder implementation
//!
//! Orchestrates one build-and-submit attempt by composing the context,
//! instructions, simulation, signing and output modules:
//!
//! 1. fetch a blockhash for this attempt
//! 2. plan the base instructions around a fresh ephemeral account
//! 3. simulate to estimate compute units, pad the estimate
//! 4. price the unit from recent prioritization fees
//! 5. prepend limit and price, validate ordering
//! 6. sign (ephemeral, then payer) and submit without preflight
//!
//! The builder never waits for confirmation.

use crate::rpc_manager::{LedgerRpc, SendOptions};
use crate::structured_logging::StructuredLogger;
use crate::tx_builder::{
    budget::BudgetPolicy,
    context::AttemptContext,
    errors::{RpcStage, TransactionBuilderError},
    instructions::{plan_base_instructions, sanity_check_ix_order, TransactionPlan},
    output::SubmittedTransaction,
    signing::sign_in_order,
    simulate::{compile_message, estimate_compute_units},
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{Keypair, Signer},
};
use std::sync::Arc;
use tracing::debug;

/// Builds, signs and submits landing transactions
pub struct TxBuilder<R: LedgerRpc + ?Sized> {
    rpc: Arc<R>,
    payer: Arc<Keypair>,
    plan: TransactionPlan,
    budget: BudgetPolicy,
    commitment: CommitmentConfig,
}

impl<R: LedgerRpc + ?Sized> TxBuilder<R> {
    pub fn new(
        rpc: Arc<R>,
        payer: Arc<Keypair>,
        plan: TransactionPlan,
        budget: BudgetPolicy,
        commitment: CommitmentConfig,
    ) -> Self {
        Self {
            rpc,
            payer,
            plan,
            budget,
            commitment,
        }
    }

    /// Run one complete build-and-submit attempt
    ///
    /// Every network-derived input (blockhash, compute units, fee) is fetched
    /// inside this call; nothing is reused from a previous attempt.
    pub async fn build_and_submit(
        &self,
        attempt: u32,
        logger: &StructuredLogger,
    ) -> Result<SubmittedTransaction, TransactionBuilderError> {
        let payer = self.payer.pubkey();

        let blockhash = self
            .rpc
            .get_latest_blockhash(self.commitment)
            .await
            .map_err(|e| TransactionBuilderError::rpc(RpcStage::Blockhash, e))?;
        let ctx = AttemptContext::new(blockhash);
        debug!(?ctx, "Prepared attempt context");

        let base = plan_base_instructions(&self.plan, &payer, &ctx.ephemeral_pubkey())?;

        let estimate =
            estimate_compute_units(&*self.rpc, &payer, &base.for_simulation(), ctx.blockhash)
                .await?;
        let cu_limit = self.budget.compute_unit_limit(estimate);

        let fees = self
            .rpc
            .get_recent_prioritization_fees(&self.plan.fee_accounts())
            .await
            .map_err(|e| TransactionBuilderError::rpc(RpcStage::PriorityFees, e))?;
        let cu_price = self.budget.priority_fee(&fees);
        logger.log_compute_budget(estimate, cu_limit, fees.len(), cu_price);

        let planned = base.with_compute_budget(cu_limit, cu_price);
        sanity_check_ix_order(&planned.instructions)?;

        let message = compile_message(&payer, &planned.instructions, ctx.blockhash)?;
        let tx = sign_in_order(message, &[&ctx.ephemeral, &*self.payer])?;

        let local_signature = tx.signatures.first().copied().ok_or_else(|| {
            TransactionBuilderError::Signing("signed transaction has no signatures".to_string())
        })?;
        let mut submitted = SubmittedTransaction {
            attempt,
            signature: local_signature,
            blockhash: ctx.blockhash,
            ephemeral: ctx.ephemeral_pubkey(),
            compute_unit_limit: cu_limit,
            compute_unit_price: cu_price,
        };

        match self
            .rpc
            .send_transaction(&tx, SendOptions::fire_and_forget(self.commitment))
            .await
        {
            Ok(signature) => submitted.signature = signature,
            Err(e) if e.may_have_been_delivered() => {
                logger.log_submission_uncertain(attempt, &submitted.signature, &e.to_string());
                return Err(TransactionBuilderError::SubmissionUncertain {
                    submission: Box::new(submitted),
                    source: e,
                });
            }
            Err(e) => return Err(TransactionBuilderError::rpc(RpcStage::Submission, e)),
        }
        logger.log_submitted(attempt, &submitted.signature, &submitted.blockhash);

        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::get_static_account_keys;
    use crate::rpc_manager::RpcManagerError;
    use crate::test_utils::MockLedgerRpc;
    use solana_sdk::{
        compute_budget::{self, ComputeBudgetInstruction},
        pubkey::Pubkey,
    };

    fn test_plan() -> TransactionPlan {
        TransactionPlan {
            destination: Pubkey::new_unique(),
            transfer_lamports: 5_000,
            loaded_accounts_data_size_limit: 65_536,
            first_program: Pubkey::new_unique(),
            second_program: Pubkey::new_unique(),
        }
    }

    fn builder(rpc: Arc<MockLedgerRpc>) -> TxBuilder<MockLedgerRpc> {
        TxBuilder::new(
            rpc,
            Arc::new(Keypair::new()),
            test_plan(),
            BudgetPolicy::default(),
            CommitmentConfig::confirmed(),
        )
    }

    #[tokio::test]
    async fn test_build_and_submit_reference_budget() {
        let rpc = Arc::new(
            MockLedgerRpc::new()
                .with_units_consumed(1_000)
                .with_prioritization_fees(vec![50, 120, 80]),
        );
        let builder = builder(rpc.clone());

        let submitted = builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .expect("submitted");

        assert_eq!(submitted.compute_unit_limit, 1_400);
        assert_eq!(submitted.compute_unit_price, 132);
        assert_eq!(submitted.attempt, 1);

        let sent = rpc.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].signatures[0], submitted.signature);
        assert_eq!(*sent[0].message.recent_blockhash(), submitted.blockhash);
        assert_eq!(rpc.issued_blockhashes(), vec![submitted.blockhash]);
    }

    #[tokio::test]
    async fn test_submitted_message_layout() {
        let rpc = Arc::new(MockLedgerRpc::new().with_units_consumed(2_000));
        let builder = builder(rpc.clone());

        let submitted = builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .unwrap();

        let sent = rpc.sent_transactions();
        let tx = &sent[0];
        let keys = get_static_account_keys(&tx.message);
        let ixs = tx.message.instructions();
        assert_eq!(ixs.len(), 6);

        let program_at = |i: usize| keys[ixs[i].program_id_index as usize];
        assert_eq!(program_at(0), compute_budget::id());
        assert_eq!(program_at(1), compute_budget::id());
        assert_eq!(
            ixs[0].data,
            ComputeBudgetInstruction::set_compute_unit_limit(submitted.compute_unit_limit).data
        );
        assert_eq!(
            ixs[1].data,
            ComputeBudgetInstruction::set_compute_unit_price(submitted.compute_unit_price).data
        );
        assert_eq!(ixs[4].data, vec![0x00]);
        assert_eq!(ixs[5].data, vec![0x01]);

        // payer then ephemeral as required signers
        assert_eq!(tx.message.header().num_required_signatures, 2);
        assert_eq!(keys[1], submitted.ephemeral);
        assert!(tx.verify_with_results().iter().all(|ok| *ok));
    }

    #[tokio::test]
    async fn test_submission_flags() {
        let rpc = Arc::new(MockLedgerRpc::new());
        let builder = builder(rpc.clone());

        builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .unwrap();

        let options = rpc.last_send_options().expect("send options recorded");
        assert!(options.skip_preflight);
        assert_eq!(options.max_retries, 0);
        assert_eq!(options.commitment, CommitmentConfig::confirmed());
    }

    #[tokio::test]
    async fn test_fee_lookup_uses_program_addresses() {
        let rpc = Arc::new(MockLedgerRpc::new());
        let builder = builder(rpc.clone());

        builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .unwrap();

        assert_eq!(
            rpc.fee_lookup_addresses(),
            vec![builder.plan.first_program, builder.plan.second_program]
        );
    }

    #[tokio::test]
    async fn test_blockhash_failure_is_retryable() {
        let rpc = Arc::new(MockLedgerRpc::new().with_blockhash_error(RpcManagerError::Timeout {
            endpoint: "mock".to_string(),
        }));
        let builder = builder(rpc.clone());

        let err = builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(
            err,
            TransactionBuilderError::Rpc {
                stage: RpcStage::Blockhash,
                ..
            }
        ));
        assert!(rpc.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_simulation_failure_skips_submission() {
        let rpc = Arc::new(MockLedgerRpc::new().with_simulation_error("InsufficientFundsForFee"));
        let builder = builder(rpc.clone());

        let err = builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .unwrap_err();

        assert!(!err.is_retryable());
        assert!(rpc.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_each_attempt_uses_new_blockhash_and_account() {
        let rpc = Arc::new(MockLedgerRpc::new());
        let builder = builder(rpc.clone());
        let logger = StructuredLogger::new("test".to_string());

        let first = builder.build_and_submit(1, &logger).await.unwrap();
        let second = builder.build_and_submit(2, &logger).await.unwrap();

        assert_ne!(first.blockhash, second.blockhash);
        assert_ne!(first.ephemeral, second.ephemeral);
        assert_ne!(first.signature, second.signature);
        assert_eq!(rpc.simulate_calls(), 2);
    }

    #[tokio::test]
    async fn test_send_timeout_carries_local_signature() {
        let rpc = Arc::new(MockLedgerRpc::new().with_send_timeouts(1));
        let builder = builder(rpc.clone());

        let err = builder
            .build_and_submit(1, &StructuredLogger::new("test".to_string()))
            .await
            .unwrap_err();

        assert!(!err.is_retryable());
        match err {
            TransactionBuilderError::SubmissionUncertain { submission, source } => {
                let sent = rpc.sent_transactions();
                assert_eq!(sent.len(), 1);
                assert_eq!(submission.signature, sent[0].signatures[0]);
                assert_eq!(submission.blockhash, *sent[0].message.recent_blockhash());
                assert!(matches!(source, RpcManagerError::Timeout { .. }));
            }
            other => panic!("Expected SubmissionUncertain, got {:?}", other),
        }
    }
}
