//! Core types for the fraud and security subsystem

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Well-known event categories
///
/// Events are categorized by free-form strings so route handlers can attach
/// their own categories; these are the ones this crate interprets.
pub mod event_kind {
    /// A completed transaction
    pub const TRANSACTION: &str = "transaction";
    /// A transaction refused by the risk engine
    pub const TRANSACTION_BLOCKED: &str = "transaction_blocked";
    /// A user login
    pub const LOGIN: &str = "login";
    /// Activity flagged by a heuristic
    pub const SUSPICIOUS_ACTIVITY: &str = "suspicious_activity";
}

/// An immutable security event
///
/// Events carry an open `details` map rather than a fixed schema because
/// callers attach arbitrary context per category (`recipient`, `location`,
/// `ipAddress`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event ID
    pub event_id: Uuid,

    /// User the event concerns, if any
    pub user_id: Option<String>,

    /// Event category
    pub kind: String,

    /// Arbitrary key-value payload
    pub details: HashMap<String, serde_json::Value>,

    /// Risk score attached by the caller (0-100)
    pub risk_score: Option<u8>,

    /// Creation timestamp, stamped on append
    pub timestamp: DateTime<Utc>,
}

impl SecurityEvent {
    /// Create a new event of the given category
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id: None,
            kind: kind.into(),
            details: HashMap::new(),
            risk_score: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a user ID
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach a detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attach a risk score
    pub fn with_risk_score(mut self, score: u8) -> Self {
        self.risk_score = Some(score.min(100));
        self
    }

    /// Read a detail value as a string, if present and a string
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(|v| v.as_str())
    }
}

/// Action derived from a fraud risk score
///
/// Ordered by restrictiveness: `Allow < Review < Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskAction {
    /// Let the transaction through
    Allow,
    /// Hold for manual review
    Review,
    /// Refuse the transaction
    Block,
}

/// Computed fraud risk for a single transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRisk {
    /// Sum of rule contributions (never negative, uncapped)
    pub score: u32,

    /// Labels of the rules that fired, in evaluation order
    pub factors: Vec<String>,

    /// Decision derived from the score
    pub action: RiskAction,
}

/// Transaction under risk assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCheck {
    /// User initiating the transaction
    pub user_id: String,

    /// Transaction amount
    pub amount: Decimal,

    /// Transaction kind (e.g. "transfer", "airtime")
    pub kind: String,

    /// Recipient identifier, if this is a transfer
    pub recipient: Option<String>,

    /// Location the transaction originates from
    pub location: Option<String>,

    /// Hour of day override (0-23); defaults to the current UTC hour
    pub time_of_day: Option<u32>,
}

impl TransactionCheck {
    /// Create a check for the given user and amount
    pub fn new(user_id: impl Into<String>, amount: Decimal, kind: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            kind: kind.into(),
            recipient: None,
            location: None,
            time_of_day: None,
        }
    }

    /// Set the recipient
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Set the originating location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Override the hour of day used by the unusual-time rule
    pub fn at_hour(mut self, hour: u32) -> Self {
        self.time_of_day = Some(hour);
        self
    }
}

/// Per-identifier fixed-window counter state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitCounter {
    /// Requests seen in the current window
    pub count: u32,

    /// When the current window closes
    pub reset_time: DateTime<Utc>,

    /// Sticky block flag; refused until the window resets
    pub blocked: bool,
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// When the identifier's window resets
    pub reset_time: DateTime<Utc>,
}

/// Authenticated ciphertext with its nonce and tag, all lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Ciphertext
    pub encrypted: String,

    /// Initialization vector, unique per encryption
    pub iv: String,

    /// Authentication tag
    pub tag: String,
}

impl EncryptedPayload {
    /// Pack into a single `encrypted:iv:tag` string for storage
    pub fn pack(&self) -> String {
        format!("{}:{}:{}", self.encrypted, self.iv, self.tag)
    }

    /// Parse a packed `encrypted:iv:tag` string
    pub fn unpack(packed: &str) -> Result<Self> {
        let parts: Vec<&str> = packed.split(':').collect();
        if parts.len() != 3 {
            return Err(Error::DecryptionFailure(format!(
                "expected 3 colon-delimited parts, got {}",
                parts.len()
            )));
        }
        Ok(Self {
            encrypted: parts[0].to_string(),
            iv: parts[1].to_string(),
            tag: parts[2].to_string(),
        })
    }
}

/// Salted password hash, both fields lowercase hex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHash {
    /// Derived key
    pub hash: String,

    /// Random salt used for derivation
    pub salt: String,
}

/// Aggregate security metrics over the trailing 24 hours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityMetrics {
    /// Events recorded
    pub total_events: usize,

    /// Events with a risk score above the high-risk threshold
    pub high_risk_events: usize,

    /// Transactions refused by the risk engine
    pub blocked_transactions: usize,

    /// Distinct users with at least one event
    pub active_users: usize,
}

/// Overall subsystem health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// No issues detected
    Secure,
    /// One or two issues detected
    Warning,
    /// More than two issues detected
    Critical,
}

/// Security posture summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityStatus {
    /// Overall level
    pub status: StatusLevel,

    /// Issues detected
    pub issues: Vec<String>,

    /// Suggested follow-ups, one per issue
    pub recommendations: Vec<String>,
}

/// Session under validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session owner
    pub user_id: String,

    /// Client IP address
    pub ip_address: Option<String>,

    /// Client user agent
    pub user_agent: Option<String>,

    /// Last recorded activity on this session
    pub last_activity: DateTime<Utc>,
}

/// Outcome of a session check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionVerdict {
    /// Whether the session may continue
    pub valid: bool,

    /// Why the session was refused, if it was
    pub reason: Option<String>,
}

impl SessionVerdict {
    /// A passing verdict
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// A failing verdict with the given reason
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}
