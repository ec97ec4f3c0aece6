//! `LedgerRpc` over the nonblocking Solana `RpcClient`

use super::{LandedTransaction, LedgerRpc, RpcManagerError, RpcResult, SendOptions, SimulationOutcome};
use async_trait::async_trait;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::{
    config::{RpcSendTransactionConfig, RpcSimulateTransactionConfig, RpcTransactionConfig},
    request::RpcRequest,
};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::{sync::Arc, time::Duration};
use tracing::trace;

/// Production ledger client
#[derive(Clone)]
pub struct SolanaRpc {
    client: Arc<RpcClient>,
    endpoint: String,
}

impl std::fmt::Debug for SolanaRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpc")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl SolanaRpc {
    /// Create a client for `url` with a per-request timeout
    pub fn new(url: &str, timeout: Duration, commitment: CommitmentConfig) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(url.to_string(), timeout, commitment);
        Self {
            client: Arc::new(client),
            endpoint: url.to_string(),
        }
    }

    fn map_err(&self, err: solana_client::client_error::ClientError) -> RpcManagerError {
        RpcManagerError::from_client_error(err, &self.endpoint)
    }
}

#[async_trait]
impl LedgerRpc for SolanaRpc {
    async fn get_latest_blockhash(&self, commitment: CommitmentConfig) -> RpcResult<Hash> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(|e| self.map_err(e))?;
        trace!(%blockhash, last_valid_block_height, "Fetched latest blockhash");
        Ok(blockhash)
    }

    async fn is_blockhash_valid(
        &self,
        blockhash: &Hash,
        commitment: CommitmentConfig,
    ) -> RpcResult<bool> {
        self.client
            .is_blockhash_valid(blockhash, commitment)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> RpcResult<Option<LandedTransaction>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(commitment),
            max_supported_transaction_version: Some(0),
        };

        // `getTransaction` answers `null` until the node has the transaction;
        // the typed client helper treats that as an error, so ask for an Option.
        let response: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .client
            .send(
                RpcRequest::GetTransaction,
                json!([signature.to_string(), config]),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(response.map(|tx| LandedTransaction {
            slot: tx.slot,
            err: tx
                .transaction
                .meta
                .as_ref()
                .and_then(|meta| meta.err.as_ref())
                .map(|err| format!("{err:?}")),
        }))
    }

    async fn simulate(&self, transaction: &VersionedTransaction) -> RpcResult<SimulationOutcome> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            ..RpcSimulateTransactionConfig::default()
        };

        let response = self
            .client
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(SimulationOutcome {
            units_consumed: response.value.units_consumed,
            err: response.value.err.as_ref().map(|err| format!("{err:?}")),
            logs: response.value.logs.unwrap_or_default(),
        })
    }

    async fn get_recent_prioritization_fees(&self, addresses: &[Pubkey]) -> RpcResult<Vec<u64>> {
        let fees = self
            .client
            .get_recent_prioritization_fees(addresses)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(fees.into_iter().map(|f| f.prioritization_fee).collect())
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> RpcResult<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: options.skip_preflight,
            preflight_commitment: Some(options.commitment.commitment),
            max_retries: Some(options.max_retries),
            ..RpcSendTransactionConfig::default()
        };

        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| self.map_err(e))
    }
}
