//! Session validation

use crate::store::EventStore;
use crate::types::{SessionContext, SessionVerdict};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Maximum session age before forced re-authentication
const MAX_SESSION_AGE_HOURS: i64 = 24;

/// Trailing window checked for suspicious activity
const SUSPICIOUS_WINDOW_HOURS: i64 = 1;

/// Risk score above which a user's recent activity invalidates the session
const SUSPICIOUS_SCORE: u8 = 50;

/// Validates sessions against age and recent risk activity
///
/// Rules run in order and the first failure wins: an expired session is
/// reported as expired even if the user also has suspicious activity.
pub struct SessionValidator {
    events: Arc<dyn EventStore>,
}

impl SessionValidator {
    /// Create a validator over the given event store
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Check a session; never errors on well-formed input
    pub fn validate(&self, session: &SessionContext) -> SessionVerdict {
        let now = Utc::now();

        if now - session.last_activity > Duration::hours(MAX_SESSION_AGE_HOURS) {
            return SessionVerdict::rejected("Session expired");
        }

        let since = now - Duration::hours(SUSPICIOUS_WINDOW_HOURS);
        let suspicious = self
            .events
            .recent_for_user(&session.user_id, since)
            .iter()
            .any(|e| e.risk_score.map_or(false, |s| s > SUSPICIOUS_SCORE));

        if suspicious {
            return SessionVerdict::rejected("Suspicious activity detected");
        }

        SessionVerdict::ok()
    }
}
