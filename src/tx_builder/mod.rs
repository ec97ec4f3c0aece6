//! Transaction Builder & Submitter
//!
//! Produces and broadcasts one fully-formed, signed landing transaction per
//! call and hands back what the confirmation poller needs.
//!
//! ## Architecture
//!
//! - **errors**: Error taxonomy with retryable/fatal classification
//! - **budget**: Compute-unit limit and priority-fee arithmetic
//! - **context**: Per-attempt blockhash and ephemeral account
//! - **instructions**: Instruction planning and ordering validation
//! - **simulate**: Compute-unit estimation via simulation
//! - **signing**: Ordered signing with full-authorization check
//! - **output**: Submission result
//! - **builder**: The build-and-submit pipeline
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use solana_sdk::{commitment_config::CommitmentConfig, signature::Keypair};
//! use tx_lander::rpc_manager::SolanaRpc;
//! use tx_lander::structured_logging::StructuredLogger;
//! use tx_lander::tx_builder::{BudgetPolicy, TransactionPlan, TxBuilder};
//!
//! # async fn example(plan: TransactionPlan) -> Result<(), tx_lander::tx_builder::TransactionBuilderError> {
//! let rpc = Arc::new(SolanaRpc::new(
//!     "http://127.0.0.1:8899",
//!     std::time::Duration::from_secs(30),
//!     CommitmentConfig::confirmed(),
//! ));
//! let builder = TxBuilder::new(
//!     rpc,
//!     Arc::new(Keypair::new()),
//!     plan,
//!     BudgetPolicy::default(),
//!     CommitmentConfig::confirmed(),
//! );
//!
//! let submitted = builder
//!     .build_and_submit(1, &StructuredLogger::new("example".to_string()))
//!     .await?;
//! println!("sent {} against {}", submitted.signature, submitted.blockhash);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::{RpcStage, TransactionBuilderError};

mod budget;
mod builder;
mod context;
mod instructions;
mod output;
mod signing;
mod simulate;

pub use budget::BudgetPolicy;
pub use builder::TxBuilder;
pub use context::AttemptContext;
pub use instructions::{
    plan_base_instructions, sanity_check_ix_order, InstructionPlan, TransactionPlan,
    FIRST_PROGRAM_DISCRIMINANT, MAX_COMPUTE_UNIT_LIMIT, SECOND_PROGRAM_DISCRIMINANT,
};
pub use output::SubmittedTransaction;
pub use signing::sign_in_order;
pub use simulate::{build_sim_tx, compile_message, estimate_compute_units};
