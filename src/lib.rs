//! Fraud and security subsystem for a mobile-banking backend
//!
//! Provides the decision logic behind the banking API's security layer:
//!
//! - Rule-based transaction risk scoring with allow/review/block decisions
//! - Fixed-window rate limiting per IP or user
//! - An append-only security event log with metrics and posture checks
//! - Authenticated field encryption, password hashing, tokens, and OTPs
//! - Session validation against age and recent risk activity
//! - Recursive masking of sensitive fields before logging
//!
//! The event log and counter map are injected stores ([`EventStore`],
//! [`CounterStore`]) so tests run against isolated instances and production
//! can swap in a distributed backend. All operations are in-memory and
//! synchronous; each public method call is the unit of atomicity.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod event_log;
pub mod masking;
pub mod rate_limit;
pub mod scoring;
pub mod session;
pub mod store;
pub mod types;

pub use config::RiskConfig;
pub use crypto::CryptoUtil;
pub use error::{Error, Result};
pub use event_log::{AlertHook, SecurityEventLog, HIGH_RISK_THRESHOLD};
pub use masking::mask_sensitive;
pub use rate_limit::RateLimiter;
pub use scoring::RiskEngine;
pub use session::SessionValidator;
pub use store::{CounterStore, EventStore, InMemoryCounterStore, InMemoryEventStore};
pub use types::*;
