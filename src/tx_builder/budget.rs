//! Compute-unit limit and priority-fee arithmetic
//!
//! Both values are derived per attempt from network telemetry and padded
//! upward.
//!
//! Margins are whole percentages and the math is integer-only, so
//! `estimate = 1000` yields exactly `1400` with the default 10% + 300.

use serde::{Deserialize, Serialize};

/// Padding applied to simulated compute units and observed fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetPolicy {
    /// Percentage added on top of the simulated compute units
    pub cu_margin_percent: u64,
    /// Flat number of compute units added after the margin
    pub cu_buffer: u64,
    /// Percentage added on top of the highest observed prioritization fee
    pub fee_margin_percent: u64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            cu_margin_percent: 10,
            cu_buffer: 300,
            fee_margin_percent: 10,
        }
    }
}

impl BudgetPolicy {
    /// `ceil(estimate * (1 + margin) + buffer)`, saturating at `u32::MAX`
    pub fn compute_unit_limit(&self, estimate: u64) -> u32 {
        let scaled = estimate as u128 * (100 + self.cu_margin_percent as u128);
        let padded = scaled.div_ceil(100) + self.cu_buffer as u128;
        u32::try_from(padded).unwrap_or(u32::MAX)
    }

    /// `round(max(fees) * (1 + margin))`; an empty fee set prices at zero
    pub fn priority_fee(&self, fees: &[u64]) -> u64 {
        let Some(highest) = fees.iter().copied().max() else {
            return 0;
        };
        // round half up
        let scaled = highest as u128 * (100 + self.fee_margin_percent as u128);
        let rounded = (scaled + 50) / 100;
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }
}
