//! Eviction Policy Module
//!
//! Bookkeeping and victim selection for the recency, frequency and
//! insertion-order eviction policies.

use std::collections::{HashMap, VecDeque};

use crate::config::EvictionPolicyKind;

// == Policy Tracker ==
/// Per-policy bookkeeping over the keys currently in the store.
///
/// A tracker only ever holds keys that are present in the backing map, so
/// victim selection never nominates an absent key. Swapping policies discards
/// the old bookkeeping wholesale and rebuilds from the current entry set.
#[derive(Debug)]
pub(crate) enum PolicyTracker {
    /// Recency order: front = most recently used, back = least recently used
    Lru(VecDeque<String>),
    /// Access counters per key; victim = minimum (count, key)
    Lfu(HashMap<String, u64>),
    /// Insertion order: front = newest insertion, back = oldest
    Fifo(VecDeque<String>),
}

impl PolicyTracker {
    // == Constructor ==
    /// Creates an empty tracker for the given policy.
    pub(crate) fn new(kind: EvictionPolicyKind) -> Self {
        match kind {
            EvictionPolicyKind::Lru => Self::Lru(VecDeque::new()),
            EvictionPolicyKind::Lfu => Self::Lfu(HashMap::new()),
            EvictionPolicyKind::Fifo => Self::Fifo(VecDeque::new()),
        }
    }

    /// Creates a tracker seeded from the current key set.
    ///
    /// Used when the configured policy changes at runtime: old bookkeeping is
    /// discarded and tracking restarts from the live entries.
    pub(crate) fn rebuild(kind: EvictionPolicyKind, keys: impl Iterator<Item = String>) -> Self {
        let mut tracker = Self::new(kind);
        for key in keys {
            tracker.on_insert(&key);
        }
        tracker
    }

    /// Returns the policy this tracker implements.
    pub(crate) fn kind(&self) -> EvictionPolicyKind {
        match self {
            Self::Lru(_) => EvictionPolicyKind::Lru,
            Self::Lfu(_) => EvictionPolicyKind::Lfu,
            Self::Fifo(_) => EvictionPolicyKind::Fifo,
        }
    }

    // == On Insert ==
    /// Records an insert or replace of a key.
    ///
    /// A replacing put refreshes recency and insertion position and resets
    /// the frequency counter, matching a freshly created entry.
    pub(crate) fn on_insert(&mut self, key: &str) {
        match self {
            Self::Lru(order) | Self::Fifo(order) => {
                order.retain(|k| k != key);
                order.push_front(key.to_string());
            }
            Self::Lfu(counters) => {
                counters.insert(key.to_string(), 0);
            }
        }
    }

    // == On Access ==
    /// Records a read of a key.
    pub(crate) fn on_access(&mut self, key: &str) {
        match self {
            Self::Lru(order) => {
                order.retain(|k| k != key);
                order.push_front(key.to_string());
            }
            Self::Lfu(counters) => {
                if let Some(count) = counters.get_mut(key) {
                    *count += 1;
                }
            }
            // Insertion order is unaffected by reads
            Self::Fifo(_) => {}
        }
    }

    // == On Remove ==
    /// Stops tracking a key.
    pub(crate) fn on_remove(&mut self, key: &str) {
        match self {
            Self::Lru(order) | Self::Fifo(order) => order.retain(|k| k != key),
            Self::Lfu(counters) => {
                counters.remove(key);
            }
        }
    }

    // == Select Victim ==
    /// Nominates and stops tracking the next eviction victim.
    ///
    /// Deterministic given the bookkeeping state; LFU breaks count ties by
    /// smallest key. Returns None when nothing is tracked.
    pub(crate) fn select_victim(&mut self) -> Option<String> {
        match self {
            Self::Lru(order) | Self::Fifo(order) => order.pop_back(),
            Self::Lfu(counters) => {
                let victim = counters
                    .iter()
                    .min_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| ka.cmp(kb)))
                    .map(|(key, _)| key.clone())?;
                counters.remove(&victim);
                Some(victim)
            }
        }
    }

    // == Clear ==
    /// Discards all bookkeeping.
    pub(crate) fn clear(&mut self) {
        match self {
            Self::Lru(order) | Self::Fifo(order) => order.clear(),
            Self::Lfu(counters) => counters.clear(),
        }
    }

    /// Returns the number of tracked keys.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Lru(order) | Self::Fifo(order) => order.len(),
            Self::Lfu(counters) => counters.len(),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_victim_is_least_recently_used() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Lru);
        tracker.on_insert("a");
        tracker.on_insert("b");
        tracker.on_insert("c");

        // Reading "a" makes it most recently used
        tracker.on_access("a");

        assert_eq!(tracker.select_victim(), Some("b".to_string()));
        assert_eq!(tracker.select_victim(), Some("c".to_string()));
        assert_eq!(tracker.select_victim(), Some("a".to_string()));
        assert_eq!(tracker.select_victim(), None);
    }

    #[test]
    fn test_lru_reinsert_refreshes_recency() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Lru);
        tracker.on_insert("a");
        tracker.on_insert("b");
        tracker.on_insert("a");

        assert_eq!(tracker.select_victim(), Some("b".to_string()));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_lfu_victim_is_least_frequently_used() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Lfu);
        tracker.on_insert("hot");
        tracker.on_insert("cold");
        tracker.on_access("hot");
        tracker.on_access("hot");
        tracker.on_access("cold");

        assert_eq!(tracker.select_victim(), Some("cold".to_string()));
        assert_eq!(tracker.select_victim(), Some("hot".to_string()));
    }

    #[test]
    fn test_lfu_tie_broken_by_smallest_key() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Lfu);
        tracker.on_insert("b");
        tracker.on_insert("a");
        tracker.on_insert("c");

        assert_eq!(tracker.select_victim(), Some("a".to_string()));
        assert_eq!(tracker.select_victim(), Some("b".to_string()));
    }

    #[test]
    fn test_fifo_reads_do_not_reorder() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Fifo);
        tracker.on_insert("a");
        tracker.on_insert("b");
        tracker.on_insert("c");

        tracker.on_access("a");
        tracker.on_access("a");

        assert_eq!(tracker.select_victim(), Some("a".to_string()));
        assert_eq!(tracker.select_victim(), Some("b".to_string()));
    }

    #[test]
    fn test_fifo_reput_refreshes_insertion_position() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Fifo);
        tracker.on_insert("a");
        tracker.on_insert("b");
        tracker.on_insert("a");

        assert_eq!(tracker.select_victim(), Some("b".to_string()));
    }

    #[test]
    fn test_remove_stops_tracking() {
        let mut tracker = PolicyTracker::new(EvictionPolicyKind::Lru);
        tracker.on_insert("a");
        tracker.on_insert("b");
        tracker.on_remove("a");

        assert_eq!(tracker.select_victim(), Some("b".to_string()));
        assert_eq!(tracker.select_victim(), None);
    }

    #[test]
    fn test_rebuild_seeds_from_current_keys() {
        let keys = ["a", "b"].iter().map(|k| k.to_string());
        let mut tracker = PolicyTracker::rebuild(EvictionPolicyKind::Lfu, keys);

        assert_eq!(tracker.kind(), EvictionPolicyKind::Lfu);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.select_victim(), Some("a".to_string()));
    }
}
