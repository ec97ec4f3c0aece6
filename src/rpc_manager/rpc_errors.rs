use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_rpc_client_api::request::RpcError;
use std::time::Duration;
use thiserror::Error;

/// Ledger RPC error types
#[derive(Debug, Clone, Error)]
pub enum RpcManagerError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Timeout (endpoint: {endpoint})")]
    Timeout { endpoint: String },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded (endpoint: {endpoint})")]
    RateLimitExceeded { endpoint: String },

    #[error("Blockhash not found (endpoint: {endpoint})")]
    BlockhashNotFound { endpoint: String },

    #[error("Transaction expired (endpoint: {endpoint})")]
    TransactionExpired { endpoint: String },

    #[error("Insufficient funds (endpoint: {endpoint})")]
    InsufficientFunds { endpoint: String },

    /// Response could not be decoded
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Fatal errors that should not be retried
    #[error("Fatal error: {0}")]
    Fatal(String),
}

// JSON-RPC code a node returns while it is behind or overloaded
const NODE_UNHEALTHY: i64 = -32005;

impl RpcManagerError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcManagerError::Transport { .. } => true,
            RpcManagerError::Timeout { .. } => true,
            RpcManagerError::RateLimitExceeded { .. } => true,
            RpcManagerError::BlockhashNotFound { .. } => true,
            RpcManagerError::TransactionExpired { .. } => true,

            RpcManagerError::InsufficientFunds { .. } => false,
            RpcManagerError::Decode(_) => false,
            RpcManagerError::Fatal(_) => false,

            RpcManagerError::RpcResponse { code, .. } => match code {
                Some(c) => *c == NODE_UNHEALTHY || (*c >= 500 && *c < 600),
                None => false,
            },
        }
    }

    /// Whether the node may have acted on the request despite the error
    ///
    /// True when no definitive answer came back: the request may have been
    /// delivered and processed before the connection failed or timed out.
    pub fn may_have_been_delivered(&self) -> bool {
        matches!(
            self,
            RpcManagerError::Transport { .. }
                | RpcManagerError::Timeout { .. }
                | RpcManagerError::Decode(_)
        )
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        let endpoint = endpoint.to_string();

        match err.kind() {
            ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
                let message = err.to_string();
                let lower = message.to_lowercase();
                if lower.contains("timed out") || lower.contains("timeout") {
                    return RpcManagerError::Timeout { endpoint };
                }
                if lower.contains("429") || lower.contains("too many requests") {
                    return RpcManagerError::RateLimitExceeded { endpoint };
                }
                return RpcManagerError::Transport { endpoint, message };
            }
            ClientErrorKind::SerdeJson(e) => return RpcManagerError::Decode(e.to_string()),
            _ => {}
        }

        let response_code = match err.kind() {
            ClientErrorKind::RpcError(RpcError::RpcResponseError { code, .. }) => Some(*code),
            _ => None,
        };
        let err_str = err.to_string().to_lowercase();

        // Classify based on error message
        if err_str.contains("blockhash not found") {
            RpcManagerError::BlockhashNotFound { endpoint }
        } else if err_str.contains("transaction expired") || err_str.contains("block height exceeded")
        {
            RpcManagerError::TransactionExpired { endpoint }
        } else if err_str.contains("insufficient funds") || err_str.contains("insufficient lamports")
        {
            RpcManagerError::InsufficientFunds { endpoint }
        } else if err_str.contains("rate limit")
            || err_str.contains("too many requests")
            || err_str.contains("429")
        {
            RpcManagerError::RateLimitExceeded { endpoint }
        } else if err_str.contains("timeout") || err_str.contains("timed out") {
            RpcManagerError::Timeout { endpoint }
        } else {
            RpcManagerError::RpcResponse {
                endpoint,
                message: err.to_string(),
                code: response_code.or_else(|| extract_code(&err_str)),
            }
        }
    }
}

/// Pull a JSON-RPC error code out of a rendered client error
fn extract_code(err_str: &str) -> Option<i64> {
    err_str
        .split("code:")
        .nth(1)
        .and_then(|s| s.split_whitespace().next())
        .map(|s| s.trim_end_matches([',', ')']))
        .and_then(|s| s.parse::<i64>().ok())
}

/// Backoff policy between landing attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Base delay in milliseconds
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,

    /// Jitter factor (0.0 - 1.0)
    pub jitter_factor: f64,

    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 250,
            max_delay_ms: 5000,
            jitter_factor: 0.1,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (0-indexed).
    ///
    /// Returns `None` once the attempt budget is spent.
    pub fn calculate_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }

        // Exponential backoff
        let delay_ms = self.base_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay_ms as f64);

        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * self.jitter_factor;
        let jittered_delay = (delay_ms * (1.0 + jitter)).max(0.0) as u64;

        Some(Duration::from_millis(jittered_delay))
    }

    /// Policy without any waiting, for tests and dry runs
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_factor: 0.0,
            multiplier: 1.0,
        }
    }
}
