//! Memory Store Facade Module
//!
//! The public store contract: thread-safe store primitives, tier
//! accessors, the query entry point and the configuration-change wiring.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::config::{CacheConfiguration, CacheConfigurationListener, EvictionPolicyKind};
use crate::error::Result;
use crate::query::{AttributeExtractor, Results, StoreQuery};
use crate::store::{CacheStats, CapacityLimitedStore, Element};

// == Memory Store ==
/// In-memory-only compound store: capacity-limited entry table plus the
/// embedded query engine.
///
/// Cheap to clone (shared interior) and safe to call from arbitrary threads.
/// Reads and queries may run concurrently with each other and with writes;
/// key-set iteration during a query is weakly consistent and never raises a
/// concurrent-modification failure. No operation blocks on I/O, and a
/// running query cannot be cancelled.
#[derive(Clone)]
pub struct MemoryStore {
    /// Backing map, eviction bookkeeping and stats
    inner: Arc<RwLock<CapacityLimitedStore>>,
    /// Attribute name -> extractor registry, safe for concurrent lookup
    extractors: Arc<RwLock<HashMap<String, AttributeExtractor>>>,
    /// Live configuration (consulted by flush)
    config: Arc<CacheConfiguration>,
}

impl MemoryStore {
    // == Constructor ==
    /// Constructs a store from a live cache configuration and registers for
    /// capacity/eviction-policy change notifications.
    ///
    /// An unrecognized eviction-policy selector fails construction; there is
    /// no runtime fallback.
    pub fn create(config: &Arc<CacheConfiguration>) -> Result<Self> {
        let snapshot = config.snapshot();
        let policy = EvictionPolicyKind::from_selector(&snapshot.eviction_policy)?;

        let store = Self {
            inner: Arc::new(RwLock::new(CapacityLimitedStore::new(
                snapshot.max_entries,
                policy,
                snapshot.default_ttl,
                snapshot.default_tti,
            ))),
            extractors: Arc::new(RwLock::new(HashMap::new())),
            config: config.clone(),
        };

        config.add_listener(Arc::new(StoreConfigListener {
            inner: Arc::downgrade(&store.inner),
        }));

        Ok(store)
    }

    // == Store Primitives ==
    /// Inserts or replaces an entry, evicting while over capacity.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.inner.write().put(key.into(), value, None);
    }

    /// Inserts or replaces an entry with an explicit TTL in seconds.
    pub fn put_with_ttl(&self, key: impl Into<String>, value: Value, ttl_seconds: u64) {
        self.inner.write().put(key.into(), value, Some(ttl_seconds));
    }

    /// Retrieves a value by key, updating recency bookkeeping and stats.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.write().get(key)
    }

    /// Reads a value without touching recency bookkeeping or stats.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.inner
            .read()
            .peek(key)
            .map(|element| element.value().clone())
    }

    /// Removes an entry by key, returning its value if present.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Removes every entry.
    pub fn remove_all(&self) {
        self.inner.write().remove_all();
    }

    /// Returns true when a non-expired entry exists for the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Returns the total number of entries.
    pub fn size(&self) -> usize {
        self.inner.read().len()
    }

    // == Tier Accessors ==
    /// Number of entries held in memory (this store's only tier).
    pub fn in_memory_size(&self) -> usize {
        self.size()
    }

    /// Estimated in-memory footprint in bytes.
    pub fn in_memory_size_in_bytes(&self) -> usize {
        self.inner.read().size_in_bytes()
    }

    /// Memory-only store: no off-heap tier.
    pub fn off_heap_size(&self) -> usize {
        0
    }

    /// Memory-only store: no off-heap tier.
    pub fn off_heap_size_in_bytes(&self) -> usize {
        0
    }

    /// Memory-only store: no disk tier.
    pub fn on_disk_size(&self) -> usize {
        0
    }

    /// Memory-only store: no disk tier.
    pub fn on_disk_size_in_bytes(&self) -> usize {
        0
    }

    /// Memory-only store: not part of a cluster.
    pub fn clustered_size(&self) -> usize {
        0
    }

    /// Returns true when a key is held in memory.
    pub fn contains_key_in_memory(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    /// Memory-only store: no off-heap tier.
    pub fn contains_key_off_heap(&self, _key: &str) -> bool {
        false
    }

    /// Memory-only store: no disk tier.
    pub fn contains_key_on_disk(&self, _key: &str) -> bool {
        false
    }

    /// Memory-only store: no asynchronous write buffer.
    pub fn buffer_full(&self) -> bool {
        false
    }

    // == Flush ==
    /// Not a persistent store: clears the in-memory data when the cache's
    /// clear-on-flush flag is set, otherwise a no-op.
    pub fn flush(&self) {
        if self.config.clear_on_flush() {
            debug!("flush clearing in-memory store");
            self.remove_all();
        }
    }

    // == Expiry ==
    /// Proactively removes expired entries; idempotent.
    pub fn expire_elements(&self) -> usize {
        self.inner.write().expire_elements()
    }

    // == Reconfiguration ==
    /// Updates the capacity bound; enforced on subsequent puts.
    pub fn set_capacity(&self, capacity: usize) {
        self.inner.write().set_capacity(capacity);
    }

    /// Swaps the eviction policy, restarting bookkeeping from the current
    /// entry set.
    pub fn set_eviction_policy(&self, policy: EvictionPolicyKind) {
        self.inner.write().set_eviction_policy(policy);
    }

    /// Returns the active eviction policy.
    pub fn eviction_policy(&self) -> EvictionPolicyKind {
        self.inner.read().eviction_policy()
    }

    // == Query Surface ==
    /// Idempotently merges attribute extractors into the registry.
    pub fn set_attribute_extractors(&self, extractors: HashMap<String, AttributeExtractor>) {
        self.extractors.write().extend(extractors);
    }

    /// Executes a query against the live entry set.
    pub fn execute_query(&self, query: &StoreQuery) -> Result<Results> {
        crate::query::executor::execute(self, query)
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }

    // == Internal Query Support ==
    /// Weakly consistent snapshot of the current key set.
    pub(crate) fn key_snapshot(&self) -> Vec<String> {
        self.inner.read().key_snapshot()
    }

    /// Clones the current element for a key, skipping expired entries;
    /// does not touch recency bookkeeping or stats.
    pub(crate) fn element_snapshot(&self, key: &str) -> Option<Element> {
        self.inner.read().peek(key).cloned()
    }

    /// Snapshot of the extractor registry (cheap: the extractors are Arcs).
    pub(crate) fn extractor_snapshot(&self) -> HashMap<String, AttributeExtractor> {
        self.extractors.read().clone()
    }
}

// == Configuration Listener ==
/// Reacts to live configuration changes on behalf of a store.
///
/// Holds the store interior weakly so a dropped store unregisters itself
/// naturally. Only capacity and eviction-policy changes have an effect at
/// this tier; the remaining notifications keep their default no-ops.
struct StoreConfigListener {
    inner: Weak<RwLock<CapacityLimitedStore>>,
}

impl CacheConfigurationListener for StoreConfigListener {
    fn is_active(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn memory_capacity_changed(&self, _old: usize, new: usize) {
        if let Some(inner) = self.inner.upgrade() {
            inner.write().set_capacity(new);
        }
    }

    fn eviction_policy_changed(&self, _old: EvictionPolicyKind, new: EvictionPolicyKind) {
        if let Some(inner) = self.inner.upgrade() {
            inner.write().set_eviction_policy(new);
        }
    }
}
