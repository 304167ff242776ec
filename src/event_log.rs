//! Security event log, metrics, and posture checks

use crate::store::EventStore;
use crate::types::{
    event_kind, SecurityEvent, SecurityMetrics, SecurityStatus, StatusLevel,
};
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Risk score above which an event is treated as high risk
pub const HIGH_RISK_THRESHOLD: u8 = 70;

/// Synchronous callback invoked for high-risk events
///
/// In production this forwards to an external paging or notification channel.
pub type AlertHook = Box<dyn Fn(&SecurityEvent) + Send + Sync>;

/// Append-only log of security events
///
/// Logging is fire-and-forget: it never returns an error, so recording an
/// event cannot break the caller's primary operation.
pub struct SecurityEventLog {
    store: Arc<dyn EventStore>,
    alert_hook: Option<AlertHook>,
}

impl SecurityEventLog {
    /// Create a log over the given store
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            alert_hook: None,
        }
    }

    /// Install a callback fired synchronously after each high-risk append
    pub fn with_alert_hook(mut self, hook: AlertHook) -> Self {
        self.alert_hook = Some(hook);
        self
    }

    /// Stamp and append an event
    pub fn log(&self, mut event: SecurityEvent) {
        event.timestamp = Utc::now();

        let high_risk = event.risk_score.map_or(false, |s| s > HIGH_RISK_THRESHOLD);
        self.store.append(event.clone());

        if high_risk {
            warn!(
                "High-risk security event: kind={} user={} score={}",
                event.kind,
                event.user_id.as_deref().unwrap_or("-"),
                event.risk_score.unwrap_or(0),
            );
            if let Some(hook) = &self.alert_hook {
                hook(&event);
            }
        }
    }

    /// Aggregate metrics over the trailing 24 hours
    pub fn metrics(&self) -> SecurityMetrics {
        let since = Utc::now() - Duration::hours(24);
        let events = self.store.recent(since);

        let high_risk_events = events
            .iter()
            .filter(|e| e.risk_score.map_or(false, |s| s > HIGH_RISK_THRESHOLD))
            .count();
        let blocked_transactions = events
            .iter()
            .filter(|e| e.kind == event_kind::TRANSACTION_BLOCKED)
            .count();
        let active_users: HashSet<&str> =
            events.iter().filter_map(|e| e.user_id.as_deref()).collect();

        SecurityMetrics {
            total_events: events.len(),
            high_risk_events,
            blocked_transactions,
            active_users: active_users.len(),
        }
    }

    /// Current security posture
    ///
    /// `outstanding_rate_entries` is the limiter's tracked-identifier count,
    /// supplied by the caller since the limiter is a sibling component.
    pub fn status(&self, outstanding_rate_entries: usize) -> SecurityStatus {
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        let hour_ago = Utc::now() - Duration::hours(1);
        let recent_high_risk = self
            .store
            .recent(hour_ago)
            .iter()
            .filter(|e| e.risk_score.map_or(false, |s| s > HIGH_RISK_THRESHOLD))
            .count();

        if recent_high_risk > 10 {
            issues.push(format!(
                "{} high-risk events in the last hour",
                recent_high_risk
            ));
            recommendations
                .push("Review recent transactions and consider tightening risk thresholds".to_string());
        }

        if outstanding_rate_entries > 1000 {
            issues.push(format!(
                "{} identifiers currently rate limited",
                outstanding_rate_entries
            ));
            recommendations.push("Check for scripted or distributed abuse".to_string());
        }

        let status = match issues.len() {
            0 => StatusLevel::Secure,
            1 | 2 => StatusLevel::Warning,
            _ => StatusLevel::Critical,
        };

        SecurityStatus {
            status,
            issues,
            recommendations,
        }
    }
}
