//! Capacity-Limited Store Module
//!
//! The backing map combined with eviction-policy bookkeeping, TTL/TTI
//! expiry and size accounting.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::config::EvictionPolicyKind;
use crate::store::{CacheStats, Element, PolicyTracker};

// == Capacity-Limited Store ==
/// In-memory entry table under a capacity bound enforced by an eviction
/// policy.
///
/// A capacity of 0 means unbounded (no eviction). Capacity and policy are
/// live-reconfigurable: changes take effect for subsequent puts without
/// disturbing the existing entry set.
#[derive(Debug)]
pub struct CapacityLimitedStore {
    /// Key-value storage
    entries: HashMap<String, Element>,
    /// Eviction-policy bookkeeping over the live keys
    tracker: PolicyTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed (0 = unbounded)
    capacity: usize,
    /// Default TTL in seconds for puts without explicit TTL (0 = none)
    default_ttl: u64,
    /// Default TTI in seconds (0 = none)
    default_tti: u64,
    /// Running estimate of the entries' in-memory footprint
    size_in_bytes: usize,
}

impl CapacityLimitedStore {
    // == Constructor ==
    /// Creates a store with the given capacity, policy and expiry defaults.
    pub fn new(capacity: usize, policy: EvictionPolicyKind, default_ttl: u64, default_tti: u64) -> Self {
        Self {
            entries: HashMap::new(),
            tracker: PolicyTracker::new(policy),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
            default_tti,
            size_in_bytes: 0,
        }
    }

    // == Put ==
    /// Inserts or replaces an entry, then evicts while over capacity.
    ///
    /// Eviction removes exactly one policy-nominated entry per round, never
    /// more than needed to return within bound.
    pub fn put(&mut self, key: String, value: Value, ttl: Option<u64>) {
        let effective_ttl = ttl.or(nonzero(self.default_ttl));
        let element = Element::new(key.clone(), value, effective_ttl, nonzero(self.default_tti));

        self.size_in_bytes += element.estimated_size();
        if let Some(replaced) = self.entries.insert(key.clone(), element) {
            self.size_in_bytes = self.size_in_bytes.saturating_sub(replaced.estimated_size());
        }
        self.tracker.on_insert(&key);

        while self.capacity > 0 && self.entries.len() > self.capacity {
            let Some(victim) = self.tracker.select_victim() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&victim) {
                self.size_in_bytes = self.size_in_bytes.saturating_sub(evicted.estimated_size());
                self.stats.record_eviction();
                debug!(key = %victim, "evicted entry over capacity");
            }
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key, updating recency bookkeeping and stats.
    ///
    /// An expired entry found here is removed and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get_mut(key) {
            Some(element) if element.is_expired() => {
                self.remove_entry(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                None
            }
            Some(element) => {
                element.touch();
                let value = element.value().clone();
                self.tracker.on_access(key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Reads an entry without touching recency bookkeeping or stats.
    ///
    /// Used by query scans, which must not skew eviction order. Expired
    /// entries read as absent but are left for the expiry sweep.
    pub fn peek(&self, key: &str) -> Option<&Element> {
        self.entries.get(key).filter(|element| !element.is_expired())
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.remove_entry(key);
        self.stats.set_total_entries(self.entries.len());
        removed.map(|element| element.value().clone())
    }

    // == Remove All ==
    /// Removes every entry and discards policy bookkeeping.
    pub fn remove_all(&mut self) {
        self.entries.clear();
        self.tracker.clear();
        self.size_in_bytes = 0;
        self.stats.set_total_entries(0);
    }

    // == Contains Key ==
    /// Returns true when a non-expired entry exists for the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.peek(key).is_some()
    }

    // == Expire Elements ==
    /// Proactively removes every entry whose TTL/TTI has elapsed.
    ///
    /// Idempotent; returns the number of entries removed.
    pub fn expire_elements(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, element)| element.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key);
            self.stats.record_expiration();
            debug!(key = %key, "expired entry");
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Reconfiguration ==
    /// Updates the capacity bound; enforced on subsequent puts.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Swaps the eviction policy, rebuilding bookkeeping from the current
    /// entry set.
    pub fn set_eviction_policy(&mut self, policy: EvictionPolicyKind) {
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        self.tracker = PolicyTracker::rebuild(policy, keys.into_iter());
    }

    /// Returns the active eviction policy.
    pub fn eviction_policy(&self) -> EvictionPolicyKind {
        self.tracker.kind()
    }

    // == Accessors ==
    /// Returns a weakly consistent snapshot of the current key set.
    pub fn key_snapshot(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the estimated in-memory footprint in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Removes an entry and its bookkeeping, adjusting the byte estimate.
    fn remove_entry(&mut self, key: &str) -> Option<Element> {
        let removed = self.entries.remove(key);
        if let Some(element) = &removed {
            self.tracker.on_remove(key);
            self.size_in_bytes = self.size_in_bytes.saturating_sub(element.estimated_size());
        }
        removed
    }
}

/// Treats a zero duration as "not configured".
fn nonzero(seconds: u64) -> Option<u64> {
    (seconds > 0).then_some(seconds)
}
