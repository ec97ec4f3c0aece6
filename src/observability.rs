//! Run correlation for landing logs

use crate::structured_logging::StructuredLogger;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Identifier shared by every log line of one landing run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Context of one landing run
///
/// Hands out the structured logger and the root span for the run, both
/// tagged with the same correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub correlation_id: CorrelationId,

    /// Endpoint the run talks to
    pub endpoint: String,

    /// Start time (Unix epoch seconds)
    pub started_at: u64,
}

impl RunContext {
    pub fn new(endpoint: &str) -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            correlation_id: CorrelationId::new(),
            endpoint: endpoint.to_string(),
            started_at,
        }
    }

    pub fn logger(&self) -> StructuredLogger {
        StructuredLogger::new(self.correlation_id.to_string())
    }

    /// Root span for the run; attach with `tracing::Instrument`
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "landing_run",
            run_id = %self.correlation_id,
            endpoint = %self.endpoint,
        )
    }
}
