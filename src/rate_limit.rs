//! Fixed-window rate limiting
//!
//! A counter per identifier (IP or user ID) resets at discrete window
//! boundaries. This is intentionally a fixed window, not a sliding one, so
//! bursts across a boundary are accepted; callers that need smoother
//! behavior should shorten the window.

use crate::store::CounterStore;
use crate::types::{RateLimitCounter, RateLimitDecision};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed-window rate limiter over an injected counter store
pub struct RateLimiter {
    counters: Arc<dyn CounterStore>,
}

impl RateLimiter {
    /// Create a limiter backed by the given store
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self { counters }
    }

    /// Check whether `identifier` may make another request in the current
    /// window of `window` length allowing `max_requests` requests
    ///
    /// Once an identifier exceeds the limit it stays blocked, without further
    /// counting, until its window resets or the entry is purged. Denial is a
    /// normal result, not an error; callers map it to a throttling response.
    pub fn check(
        &self,
        identifier: &str,
        window: Duration,
        max_requests: u32,
    ) -> RateLimitDecision {
        self.check_at(identifier, window, max_requests, Utc::now())
    }

    fn check_at(
        &self,
        identifier: &str,
        window: Duration,
        max_requests: u32,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let init = RateLimitCounter {
            count: 0,
            reset_time: now + window,
            blocked: false,
        };

        let state = self.counters.apply(identifier, init, &mut |counter| {
            if now > counter.reset_time {
                counter.count = 0;
                counter.reset_time = now + window;
                counter.blocked = false;
            }
            if counter.blocked {
                return;
            }
            counter.count += 1;
            if counter.count > max_requests {
                counter.blocked = true;
            }
        });

        if state.blocked {
            warn!("Rate limit exceeded: {}", identifier);
        }

        RateLimitDecision {
            allowed: !state.blocked,
            reset_time: state.reset_time,
        }
    }

    /// Drop entries whose window has fully elapsed
    ///
    /// Bounds memory growth; a genuinely new window then starts from zero.
    /// Intended to be called from a periodic maintenance job.
    pub fn purge_expired(&self) -> usize {
        let removed = self.counters.purge_expired(Utc::now());
        if removed > 0 {
            info!("Rate limiter cleanup: {} entries removed", removed);
        }
        removed
    }

    /// Explicitly forget an identifier
    pub fn reset(&self, identifier: &str) {
        self.counters.remove(identifier);
    }

    /// Number of identifiers currently tracked
    pub fn tracked_identifiers(&self) -> usize {
        self.counters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCounterStore;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(InMemoryCounterStore::new()))
    }

    #[test]
    fn test_allows_up_to_max() {
        let limiter = limiter();
        let window = Duration::minutes(1);

        for _ in 0..5 {
            let decision = limiter.check("10.0.0.1", window, 5);
            assert!(decision.allowed);
        }

        let denied = limiter.check("10.0.0.1", window, 5);
        assert!(!denied.allowed);
        assert!(denied.reset_time > Utc::now());
    }

    #[test]
    fn test_block_is_sticky_without_counting() {
        let store = Arc::new(InMemoryCounterStore::new());
        let limiter = RateLimiter::new(Arc::clone(&store) as Arc<dyn CounterStore>);
        let window = Duration::minutes(1);

        for _ in 0..10 {
            limiter.check("user-1", window, 2);
        }

        // Count stops at max + 1; hammering does not inflate it
        let state = store.apply(
            "user-1",
            RateLimitCounter {
                count: 0,
                reset_time: Utc::now(),
                blocked: false,
            },
            &mut |_| {},
        );
        assert!(state.blocked);
        assert_eq!(state.count, 3);
    }

    #[test]
    fn test_window_reset_restores_allowance() {
        let limiter = limiter();
        let window = Duration::minutes(1);
        let start = Utc::now();

        for _ in 0..3 {
            limiter.check_at("user-1", window, 2, start);
        }
        assert!(!limiter.check_at("user-1", window, 2, start).allowed);

        // Past the window boundary the identifier starts fresh
        let later = start + Duration::minutes(2);
        let decision = limiter.check_at("user-1", window, 2, later);
        assert!(decision.allowed);
        assert!(decision.reset_time > later);
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = limiter();
        let window = Duration::minutes(1);

        assert!(limiter.check("a", window, 1).allowed);
        assert!(!limiter.check("a", window, 1).allowed);
        assert!(limiter.check("b", window, 1).allowed);
    }

    #[test]
    fn test_purge_and_reset() {
        let limiter = limiter();

        limiter.check_at(
            "stale",
            Duration::minutes(1),
            5,
            Utc::now() - Duration::minutes(10),
        );
        limiter.check("fresh", Duration::minutes(5), 5);
        assert_eq!(limiter.tracked_identifiers(), 2);

        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.tracked_identifiers(), 1);

        limiter.reset("fresh");
        assert_eq!(limiter.tracked_identifiers(), 0);
    }

    #[test]
    fn test_concurrent_checks_do_not_lose_updates() {
        let limiter = Arc::new(limiter());
        let window = Duration::minutes(1);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| limiter.check("shared", window, 100).allowed)
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 200 concurrent checks against a limit of 100: exactly 100 admitted
        assert_eq!(allowed, 100);
    }
}
