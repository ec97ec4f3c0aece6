//! tx-lander
//!
//! Lands the configured transaction and reports the outcome. Exits non-zero
//! when the transaction did not land or landed with an on-chain error.

// Compiler warning configuration
#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tx_lander::{
    config::Config,
    confirmation::ConfirmationPoller,
    lander::Lander,
    observability::RunContext,
    rpc_manager::SolanaRpc,
    tx_builder::TxBuilder,
    wallet::WalletManager,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "lander.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Override retry.max_attempts
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json)?;
    info!("Starting tx-lander v{}", env!("CARGO_PKG_VERSION"));

    info!("Loading configuration from: {}", args.config);
    let mut config = Config::from_file_with_env(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(max_attempts) = args.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    config.validate().context("Invalid configuration")?;

    let commitment = config.rpc.commitment_config()?;
    let plan = config.transaction.resolve()?;

    let wallet = WalletManager::load(&config.wallet.keypair).context("Failed to load wallet")?;
    info!("Wallet address: {}", wallet.pubkey());

    let rpc = Arc::new(SolanaRpc::new(&config.rpc.url, config.rpc.timeout(), commitment));
    let builder = TxBuilder::new(
        rpc.clone(),
        wallet.keypair_arc(),
        plan,
        config.budget,
        commitment,
    );
    let poller = ConfirmationPoller::new(rpc, commitment)
        .with_poll_interval(config.confirmation.poll_interval())
        .with_max_consecutive_errors(config.confirmation.max_consecutive_errors);
    let lander = Lander::new(builder, poller, config.retry.policy());

    let run = RunContext::new(&config.rpc.url);
    let logger = run.logger();
    info!(run_id = %run.correlation_id, endpoint = %config.rpc.url, "Landing transaction");

    tokio::select! {
        outcome = lander.run(&logger).instrument(run.span()) => {
            match outcome {
                Ok(report) if report.succeeded() => {
                    info!(
                        signature = %report.signature,
                        slot = report.slot,
                        attempts = report.attempts,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Transaction landed"
                    );
                    Ok(())
                }
                Ok(report) => {
                    let reason = report.err.unwrap_or_default();
                    error!(
                        signature = %report.signature,
                        slot = report.slot,
                        error = %reason,
                        "Transaction landed but failed on-chain"
                    );
                    anyhow::bail!("Transaction {} failed on-chain: {}", report.signature, reason)
                }
                Err(e) => {
                    logger.error(&e.to_string());
                    Err(e).context("Landing run failed")
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal, abandoning landing run");
            Ok(())
        }
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = if verbose {
        "tx_lander=debug,info"
    } else {
        "tx_lander=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    Ok(())
}
