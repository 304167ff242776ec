//! Transaction fraud risk scoring

use crate::config::RiskConfig;
use crate::error::{Error, Result};
use crate::store::EventStore;
use crate::types::{event_kind, FraudRisk, TransactionCheck};
use chrono::{Duration, Timelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Rule-based fraud scorer
///
/// Each rule contributes independently to the score; contributions are summed
/// and the decision derived from configured thresholds. The amount tiers
/// stack: a very-high-amount transaction also fires the high-amount rule.
/// Scoring has no side effects; callers decide whether to record the result
/// as a security event.
pub struct RiskEngine {
    config: RiskConfig,
    events: Arc<dyn EventStore>,
}

impl RiskEngine {
    /// Create an engine with the default rule set
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self::with_config(events, RiskConfig::default())
    }

    /// Create an engine with explicit thresholds
    pub fn with_config(events: Arc<dyn EventStore>, config: RiskConfig) -> Self {
        Self { config, events }
    }

    /// Score a transaction and derive an allow/review/block decision
    ///
    /// Fails fast on an empty `user_id` or non-positive amount; well-formed
    /// input always produces a decision.
    pub fn analyze(&self, tx: &TransactionCheck) -> Result<FraudRisk> {
        if tx.user_id.trim().is_empty() {
            return Err(Error::InvalidArgument("user_id is required".to_string()));
        }
        if tx.amount <= Decimal::ZERO {
            return Err(Error::InvalidArgument(format!(
                "amount must be positive, got {}",
                tx.amount
            )));
        }

        let mut score = 0u32;
        let mut factors = Vec::new();

        if tx.amount > self.config.high_amount {
            score += self.config.high_amount_score;
            factors.push("High amount transaction".to_string());
        }

        if tx.amount > self.config.very_high_amount {
            score += self.config.very_high_amount_score;
            factors.push("Very high amount transaction".to_string());
        }

        let hour = tx.time_of_day.unwrap_or_else(|| Utc::now().hour());
        if hour < self.config.earliest_hour || hour > self.config.latest_hour {
            score += self.config.unusual_hour_score;
            factors.push("Unusual transaction time".to_string());
        }

        let history = self.events.for_user(&tx.user_id);

        let window_start = Utc::now() - Duration::minutes(self.config.frequency_window_minutes);
        let recent_transactions = history
            .iter()
            .filter(|e| e.kind == event_kind::TRANSACTION && e.timestamp >= window_start)
            .count();
        if recent_transactions > self.config.high_frequency_threshold {
            score += self.config.high_frequency_score;
            factors.push("High frequency transactions".to_string());
        }

        if let Some(recipient) = &tx.recipient {
            let known = history.iter().any(|e| {
                e.kind == event_kind::TRANSACTION
                    && e.detail_str("recipient") == Some(recipient.as_str())
            });
            if !known {
                score += self.config.new_recipient_score;
                factors.push("New recipient".to_string());
            }
        }

        if let Some(location) = &tx.location {
            let known = history
                .iter()
                .any(|e| e.detail_str("location") == Some(location.as_str()));
            if !known {
                score += self.config.new_location_score;
                factors.push("New location".to_string());
            }
        }

        Ok(FraudRisk {
            score,
            factors,
            action: self.config.action_for(score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEventStore;
    use crate::types::{RiskAction, SecurityEvent};

    fn engine() -> (Arc<InMemoryEventStore>, RiskEngine) {
        let store = Arc::new(InMemoryEventStore::new());
        let engine = RiskEngine::new(Arc::clone(&store) as Arc<dyn EventStore>);
        (store, engine)
    }

    fn daytime_tx(amount: i64) -> TransactionCheck {
        TransactionCheck::new("user-1", Decimal::from(amount), "transfer").at_hour(10)
    }

    #[test]
    fn test_clean_transaction_allowed() {
        let (_, engine) = engine();

        let risk = engine.analyze(&daytime_tx(50_000)).unwrap();
        assert_eq!(risk.score, 0);
        assert!(risk.factors.is_empty());
        assert_eq!(risk.action, RiskAction::Allow);
    }

    #[test]
    fn test_amount_tiers_stack() {
        let (_, engine) = engine();

        let risk = engine.analyze(&daytime_tx(1_500_000)).unwrap();
        // Both tiers fire for amounts over the very-high threshold
        assert_eq!(risk.score, 80);
        assert!(risk.factors.contains(&"High amount transaction".to_string()));
        assert!(risk
            .factors
            .contains(&"Very high amount transaction".to_string()));
        assert_eq!(risk.action, RiskAction::Block);
    }

    #[test]
    fn test_high_amount_only() {
        let (_, engine) = engine();

        let risk = engine.analyze(&daytime_tx(600_000)).unwrap();
        assert_eq!(risk.score, 30);
        assert_eq!(risk.factors, vec!["High amount transaction".to_string()]);
        assert_eq!(risk.action, RiskAction::Allow);
    }

    #[test]
    fn test_unusual_hour() {
        let (_, engine) = engine();

        let tx = TransactionCheck::new("user-1", Decimal::from(1_000), "transfer").at_hour(3);
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.score, 20);
        assert_eq!(risk.factors, vec!["Unusual transaction time".to_string()]);
    }

    #[test]
    fn test_high_frequency() {
        let (store, engine) = engine();

        // 11 recent transactions pushes past the >10 threshold
        for _ in 0..11 {
            store.append(
                SecurityEvent::new(event_kind::TRANSACTION)
                    .with_user("user-1")
                    .with_detail("recipient", "acct-1"),
            );
        }

        let tx = daytime_tx(1_000).with_recipient("acct-1");
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.score, 25);
        assert_eq!(risk.factors, vec!["High frequency transactions".to_string()]);
    }

    #[test]
    fn test_new_recipient_and_location() {
        let (_, engine) = engine();

        let tx = daytime_tx(1_000)
            .with_recipient("acct-9")
            .with_location("Abuja");
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.score, 35);
        assert_eq!(
            risk.factors,
            vec!["New recipient".to_string(), "New location".to_string()]
        );
    }

    #[test]
    fn test_known_recipient_and_location_score_nothing() {
        let (store, engine) = engine();

        store.append(
            SecurityEvent::new(event_kind::TRANSACTION)
                .with_user("user-1")
                .with_detail("recipient", "acct-9")
                .with_detail("location", "Lagos"),
        );

        let tx = daytime_tx(1_000)
            .with_recipient("acct-9")
            .with_location("Lagos");
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.score, 0);
        assert_eq!(risk.action, RiskAction::Allow);
    }

    #[test]
    fn test_location_known_from_any_event_kind() {
        let (store, engine) = engine();

        // Location novelty looks at all events, not just transactions
        store.append(
            SecurityEvent::new(event_kind::LOGIN)
                .with_user("user-1")
                .with_detail("location", "Lagos"),
        );

        let tx = daytime_tx(1_000).with_location("Lagos");
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.score, 0);
    }

    #[test]
    fn test_medium_risk_goes_to_review() {
        let (store, engine) = engine();

        store.append(
            SecurityEvent::new(event_kind::LOGIN)
                .with_user("user-1")
                .with_detail("location", "Lagos"),
        );

        // High amount (30) + new recipient (15), location already known
        let tx = daytime_tx(600_000)
            .with_recipient("new-user")
            .with_location("Lagos");
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.score, 45);
        assert_eq!(risk.action, RiskAction::Review);
    }

    #[test]
    fn test_recipient_history_ignores_other_users() {
        let (store, engine) = engine();

        store.append(
            SecurityEvent::new(event_kind::TRANSACTION)
                .with_user("someone-else")
                .with_detail("recipient", "acct-9"),
        );

        let tx = daytime_tx(1_000).with_recipient("acct-9");
        let risk = engine.analyze(&tx).unwrap();
        assert_eq!(risk.factors, vec!["New recipient".to_string()]);
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let (_, engine) = engine();

        let no_user = TransactionCheck::new("  ", Decimal::from(1_000), "transfer");
        assert!(matches!(
            engine.analyze(&no_user),
            Err(Error::InvalidArgument(_))
        ));

        let no_amount = TransactionCheck::new("user-1", Decimal::ZERO, "transfer");
        assert!(matches!(
            engine.analyze(&no_amount),
            Err(Error::InvalidArgument(_))
        ));
    }
}
