//! Risk scoring configuration

use crate::types::RiskAction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable thresholds for the risk engine
///
/// Defaults encode the production rule set; deployments can override
/// individual thresholds without touching scoring code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Amount above which the high-amount rule fires
    pub high_amount: Decimal,

    /// Amount above which the very-high-amount rule additionally fires
    pub very_high_amount: Decimal,

    /// Score contribution of the high-amount rule
    pub high_amount_score: u32,

    /// Score contribution of the very-high-amount rule
    pub very_high_amount_score: u32,

    /// Earliest hour (inclusive) considered a normal transaction time
    pub earliest_hour: u32,

    /// Latest hour (inclusive) considered a normal transaction time
    pub latest_hour: u32,

    /// Score contribution of the unusual-hour rule
    pub unusual_hour_score: u32,

    /// Transactions in the frequency window above which the rule fires
    pub high_frequency_threshold: usize,

    /// Trailing window for the frequency rule, in minutes
    pub frequency_window_minutes: i64,

    /// Score contribution of the high-frequency rule
    pub high_frequency_score: u32,

    /// Score contribution of the new-recipient rule
    pub new_recipient_score: u32,

    /// Score contribution of the new-location rule
    pub new_location_score: u32,

    /// Score at or above which a transaction goes to manual review
    pub review_threshold: u32,

    /// Score at or above which a transaction is refused
    pub block_threshold: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_amount: Decimal::from(500_000),
            very_high_amount: Decimal::from(1_000_000),
            high_amount_score: 30,
            very_high_amount_score: 50,
            earliest_hour: 6,
            latest_hour: 23,
            unusual_hour_score: 20,
            high_frequency_threshold: 10,
            frequency_window_minutes: 60,
            high_frequency_score: 25,
            new_recipient_score: 15,
            new_location_score: 20,
            review_threshold: 40,
            block_threshold: 70,
        }
    }
}

impl RiskConfig {
    /// Map a score to a decision
    ///
    /// Monotonic: a higher score never yields a less restrictive action.
    pub fn action_for(&self, score: u32) -> RiskAction {
        if score >= self.block_threshold {
            RiskAction::Block
        } else if score >= self.review_threshold {
            RiskAction::Review
        } else {
            RiskAction::Allow
        }
    }
}
