//! Pluggable stores for security events and rate-limit counters
//!
//! The event log and the counter map are shared mutable state across all
//! request handlers. They are injected as trait objects so tests can supply
//! isolated instances and production can swap in a distributed backend
//! without changing call sites.

use crate::types::{RateLimitCounter, SecurityEvent};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Maximum events retained by [`InMemoryEventStore`]
pub const MAX_EVENTS: usize = 10_000;

/// Append-only store of security events
pub trait EventStore: Send + Sync {
    /// Append an event; must not lose concurrent appends
    fn append(&self, event: SecurityEvent);

    /// Events with `timestamp >= since`, oldest first
    fn recent(&self, since: DateTime<Utc>) -> Vec<SecurityEvent>;

    /// Events for `user_id` with `timestamp >= since`, oldest first
    fn recent_for_user(&self, user_id: &str, since: DateTime<Utc>) -> Vec<SecurityEvent>;

    /// All retained events for `user_id`, oldest first
    fn for_user(&self, user_id: &str) -> Vec<SecurityEvent> {
        self.recent_for_user(user_id, DateTime::<Utc>::MIN_UTC)
    }

    /// Number of retained events
    fn len(&self) -> usize;

    /// Whether the store holds no events
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-memory ring buffer of events
///
/// Oldest entries are evicted once the buffer exceeds its capacity.
/// Durability is delegated to an external audit store.
pub struct InMemoryEventStore {
    events: RwLock<VecDeque<SecurityEvent>>,
    capacity: usize,
}

impl InMemoryEventStore {
    /// Create a store with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    /// Create a store with an explicit capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            capacity,
        }
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&self, event: SecurityEvent) {
        let mut events = self.events.write();
        events.push_back(event);
        while events.len() > self.capacity {
            events.pop_front();
        }
    }

    fn recent(&self, since: DateTime<Utc>) -> Vec<SecurityEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.timestamp >= since)
            .cloned()
            .collect()
    }

    fn recent_for_user(&self, user_id: &str, since: DateTime<Utc>) -> Vec<SecurityEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id) && e.timestamp >= since)
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.events.read().len()
    }
}

/// Keyed store of rate-limit counters with per-key atomic updates
pub trait CounterStore: Send + Sync {
    /// Atomically apply `f` to the counter for `key`, inserting `init` first
    /// if the key is absent; returns the counter state after the update
    fn apply(
        &self,
        key: &str,
        init: RateLimitCounter,
        f: &mut dyn FnMut(&mut RateLimitCounter),
    ) -> RateLimitCounter;

    /// Drop the entry for `key`, if any
    fn remove(&self, key: &str);

    /// Drop entries whose window has fully elapsed; returns how many
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;

    /// Number of outstanding entries
    fn len(&self) -> usize;
}

/// Concurrent in-memory counter map
///
/// The map's entry API holds the key's shard lock for the duration of the
/// update, so check-and-increment is atomic per identifier.
pub struct InMemoryCounterStore {
    counters: DashMap<String, RateLimitCounter>,
}

impl InMemoryCounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore for InMemoryCounterStore {
    fn apply(
        &self,
        key: &str,
        init: RateLimitCounter,
        f: &mut dyn FnMut(&mut RateLimitCounter),
    ) -> RateLimitCounter {
        let mut entry = self.counters.entry(key.to_string()).or_insert(init);
        f(entry.value_mut());
        entry.value().clone()
    }

    fn remove(&self, key: &str) {
        self.counters.remove(key);
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| counter.reset_time > now);
        before.saturating_sub(self.counters.len())
    }

    fn len(&self) -> usize {
        self.counters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event_kind;
    use chrono::Duration;
    use std::sync::Arc;

    #[test]
    fn test_event_store_eviction() {
        let store = InMemoryEventStore::with_capacity(3);

        for i in 0..5 {
            store.append(SecurityEvent::new(event_kind::LOGIN).with_user(format!("user-{}", i)));
        }

        assert_eq!(store.len(), 3);
        let remaining = store.recent(DateTime::<Utc>::MIN_UTC);
        // Oldest two evicted
        assert_eq!(remaining[0].user_id.as_deref(), Some("user-2"));
        assert_eq!(remaining[2].user_id.as_deref(), Some("user-4"));
    }

    #[test]
    fn test_event_store_user_filter() {
        let store = InMemoryEventStore::new();
        store.append(SecurityEvent::new(event_kind::LOGIN).with_user("alice"));
        store.append(SecurityEvent::new(event_kind::LOGIN).with_user("bob"));
        store.append(SecurityEvent::new(event_kind::TRANSACTION).with_user("alice"));
        store.append(SecurityEvent::new(event_kind::LOGIN));

        let alice = store.for_user("alice");
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|e| e.user_id.as_deref() == Some("alice")));
    }

    #[test]
    fn test_event_store_concurrent_appends() {
        let store = Arc::new(InMemoryEventStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.append(SecurityEvent::new(event_kind::LOGIN));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 800);
    }

    #[test]
    fn test_counter_store_purge() {
        let store = InMemoryCounterStore::new();
        let now = Utc::now();

        let live = RateLimitCounter {
            count: 1,
            reset_time: now + Duration::minutes(5),
            blocked: false,
        };
        let expired = RateLimitCounter {
            count: 3,
            reset_time: now - Duration::minutes(5),
            blocked: true,
        };

        store.apply("live", live, &mut |_| {});
        store.apply("expired", expired, &mut |_| {});
        assert_eq!(store.len(), 2);

        let removed = store.purge_expired(now);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }
}
