//! Configuration module for the transaction lander
//!
//! Loads the TOML configuration file, applies `.env` and environment
//! overrides, and turns the string-typed file values into the typed inputs
//! the builder, poller and retry loop take.

use crate::confirmation::{DEFAULT_MAX_CONSECUTIVE_ERRORS, DEFAULT_POLL_INTERVAL};
use crate::rpc_manager::RetryPolicy;
use crate::tx_builder::{BudgetPolicy, TransactionPlan};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Overrides `rpc.url`
pub const ENV_RPC_URL: &str = "LANDER_RPC_URL";
/// Overrides `wallet.keypair`
pub const ENV_KEYPAIR: &str = "LANDER_KEYPAIR";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Signer configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// What the landing transaction does
    #[serde(default)]
    pub transaction: TransactionConfig,

    /// Compute-unit and priority-fee margins
    #[serde(default)]
    pub budget: BudgetPolicy,

    /// Confirmation polling
    #[serde(default)]
    pub confirmation: ConfirmationConfig,

    /// Outer retry loop
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,

    /// Commitment for blockhash, validity and lookup calls
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Keypair file path or base58-encoded secret key
    #[serde(default = "default_keypair")]
    pub keypair: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Transfer recipient (base58)
    #[serde(default)]
    pub destination: String,

    /// Lamports moved to `destination`
    #[serde(default = "default_transfer_lamports")]
    pub transfer_lamports: u64,

    /// Cap on loaded account data, in bytes
    #[serde(default = "default_loaded_accounts_data_size_limit")]
    pub loaded_accounts_data_size_limit: u32,

    /// Program invoked with discriminant 0x00 (base58)
    #[serde(default)]
    pub first_program: String,

    /// Program invoked with discriminant 0x01 (base58)
    #[serde(default)]
    pub second_program: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Delay between poll ticks in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Failing ticks in a row before the outcome is reported unknown
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Symmetric jitter as a fraction of the delay (0.0 - 1.0)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

// Default value functions
fn default_rpc_url() -> String { "http://127.0.0.1:8899".to_string() }
fn default_rpc_timeout() -> u64 { 30 }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_keypair() -> String { "~/.config/solana/id.json".to_string() }
fn default_transfer_lamports() -> u64 { 1_000 }
fn default_loaded_accounts_data_size_limit() -> u32 { 65_536 }
fn default_poll_interval_ms() -> u64 { DEFAULT_POLL_INTERVAL.as_millis() as u64 }
fn default_max_consecutive_errors() -> u32 { DEFAULT_MAX_CONSECUTIVE_ERRORS }
fn default_max_attempts() -> u32 { 5 }
fn default_base_delay_ms() -> u64 { 250 }
fn default_max_delay_ms() -> u64 { 5_000 }
fn default_jitter_factor() -> f64 { 0.1 }
fn default_multiplier() -> f64 { 2.0 }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_secs: default_rpc_timeout(),
            commitment: default_commitment(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair: default_keypair(),
        }
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            transfer_lamports: default_transfer_lamports(),
            loaded_accounts_data_size_limit: default_loaded_accounts_data_size_limit(),
            first_program: String::new(),
            second_program: String::new(),
        }
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_consecutive_errors: default_max_consecutive_errors(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter_factor: default_jitter_factor(),
            multiplier: default_multiplier(),
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn commitment_config(&self) -> anyhow::Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| anyhow::anyhow!("Unknown commitment level: {}", self.commitment))
    }
}

impl TransactionConfig {
    /// Parse the configured addresses into a builder plan
    pub fn resolve(&self) -> anyhow::Result<TransactionPlan> {
        Ok(TransactionPlan {
            destination: parse_pubkey("transaction.destination", &self.destination)?,
            transfer_lamports: self.transfer_lamports,
            loaded_accounts_data_size_limit: self.loaded_accounts_data_size_limit,
            first_program: parse_pubkey("transaction.first_program", &self.first_program)?,
            second_program: parse_pubkey("transaction.second_program", &self.second_program)?,
        })
    }
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
            jitter_factor: self.jitter_factor,
            multiplier: self.multiplier,
        }
    }
}

fn parse_pubkey(field: &str, value: &str) -> anyhow::Result<Pubkey> {
    if value.trim().is_empty() {
        bail!("{} is not set", field);
    }
    Pubkey::from_str(value.trim()).with_context(|| format!("{} is not a valid address: {}", field, value))
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration with `.env` and environment variable overrides
    ///
    /// A missing file is not an error: defaults are used and the
    /// environment still applies.
    pub fn from_file_with_env(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_RPC_URL).filter(|v| !v.is_empty()) {
            self.rpc.url = url;
        }
        if let Some(keypair) = lookup(ENV_KEYPAIR).filter(|v| !v.is_empty()) {
            self.wallet.keypair = keypair;
        }
    }

    /// Reject configurations the lander cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.url.trim().is_empty() {
            bail!("rpc.url must not be empty");
        }
        if self.rpc.timeout_secs == 0 {
            bail!("rpc.timeout_secs must be greater than zero");
        }
        // getTransaction only answers at confirmed or finalized
        if !self.rpc.commitment_config()?.is_at_least_confirmed() {
            bail!(
                "rpc.commitment must be confirmed or finalized, got {}",
                self.rpc.commitment
            );
        }

        if self.wallet.keypair.trim().is_empty() {
            bail!("wallet.keypair must not be empty");
        }

        let plan = self.transaction.resolve()?;
        if plan.first_program == plan.second_program {
            bail!("transaction.first_program and transaction.second_program must differ");
        }

        if self.confirmation.poll_interval_ms == 0 {
            bail!("confirmation.poll_interval_ms must be greater than zero");
        }
        if self.confirmation.max_consecutive_errors == 0 {
            bail!("confirmation.max_consecutive_errors must be at least 1");
        }

        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            bail!("retry.jitter_factor must be within [0.0, 1.0]");
        }
        if self.retry.multiplier < 1.0 {
            bail!("retry.multiplier must be at least 1.0");
        }
        Ok(())
    }
}
