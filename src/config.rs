//! Configuration Module
//!
//! Handles cache configuration, live reconfiguration, and the listener
//! contract through which a store reacts to configuration changes.

use std::env;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, StoreError};

// == Eviction Policy Selector ==
/// The set of supported eviction policies.
///
/// Parsed from a selector string at store construction; an unrecognized
/// selector is a fatal configuration error, never a runtime fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicyKind {
    /// Recency-based (least recently used is evicted first)
    Lru,
    /// Frequency-based (least frequently used is evicted first)
    Lfu,
    /// Insertion-order-based (oldest insertion is evicted first)
    Fifo,
}

impl EvictionPolicyKind {
    /// Parses a policy selector string (case-insensitive).
    pub fn from_selector(selector: &str) -> Result<Self> {
        match selector.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            "fifo" => Ok(Self::Fifo),
            other => Err(StoreError::Configuration(format!(
                "{} isn't a valid eviction policy",
                other
            ))),
        }
    }

    /// Returns the canonical selector string for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
            Self::Fifo => "fifo",
        }
    }
}

impl fmt::Display for EvictionPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Config ==
/// Cache configuration parameters.
///
/// All values can be loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the store can hold (0 = unbounded)
    pub max_entries: usize,
    /// Eviction policy selector ("lru", "lfu" or "fifo")
    pub eviction_policy: String,
    /// Default time-to-live in seconds for entries without explicit TTL (0 = none)
    pub default_ttl: u64,
    /// Default time-to-idle in seconds (0 = none)
    pub default_tti: u64,
    /// Whether flush() clears the in-memory data
    pub clear_on_flush: bool,
    /// Whether verbose cache logging is enabled
    pub logging: bool,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum entries, 0 = unbounded (default: 1000)
    /// - `EVICTION_POLICY` - Policy selector (default: "lru")
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 = none (default: 0)
    /// - `DEFAULT_TTI` - Default TTI in seconds, 0 = none (default: 0)
    /// - `CLEAR_ON_FLUSH` - Whether flush clears memory (default: true)
    /// - `CACHE_LOGGING` - Verbose cache logging flag (default: false)
    /// - `CLEANUP_INTERVAL` - Expiry sweep interval in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            eviction_policy: env::var("EVICTION_POLICY").unwrap_or_else(|_| "lru".to_string()),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            default_tti: env::var("DEFAULT_TTI")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            clear_on_flush: env::var("CLEAR_ON_FLUSH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            logging: env::var("CACHE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            eviction_policy: "lru".to_string(),
            default_ttl: 0,
            default_tti: 0,
            clear_on_flush: true,
            logging: false,
            cleanup_interval: 1,
        }
    }
}

// == Configuration Listener ==
/// Receives notifications of live configuration changes.
///
/// All methods default to no-ops; an implementor overrides only the
/// notifications that matter for its tier. The in-memory store reacts to
/// capacity and eviction-policy changes and leaves the rest alone.
pub trait CacheConfigurationListener: Send + Sync {
    /// Whether this listener still has a live target.
    ///
    /// A listener reporting false is pruned at the next notification, so a
    /// listener whose target has been dropped does not accumulate forever.
    fn is_active(&self) -> bool {
        true
    }

    /// The in-memory capacity bound changed.
    fn memory_capacity_changed(&self, _old: usize, _new: usize) {}

    /// The eviction policy changed.
    fn eviction_policy_changed(&self, _old: EvictionPolicyKind, _new: EvictionPolicyKind) {}

    /// The default time-to-live changed.
    fn time_to_live_changed(&self, _old: u64, _new: u64) {}

    /// The default time-to-idle changed.
    fn time_to_idle_changed(&self, _old: u64, _new: u64) {}

    /// The cache logging flag changed.
    fn logging_changed(&self, _old: bool, _new: bool) {}

    /// The clear-on-flush flag changed.
    fn clear_on_flush_changed(&self, _old: bool, _new: bool) {}
}

// == Live Configuration Handle ==
/// Shared, live-reconfigurable cache configuration.
///
/// Setters update the stored config and notify every registered listener.
/// Reconfiguration is a swap visible to subsequent operations; it never
/// blocks or interrupts in-flight work.
pub struct CacheConfiguration {
    config: RwLock<CacheConfig>,
    listeners: RwLock<Vec<Arc<dyn CacheConfigurationListener>>>,
}

impl CacheConfiguration {
    /// Creates a live configuration handle from an initial config.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config: RwLock::new(config),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the current configuration.
    pub fn snapshot(&self) -> CacheConfig {
        self.config.read().clone()
    }

    /// Returns the current clear-on-flush flag.
    pub fn clear_on_flush(&self) -> bool {
        self.config.read().clear_on_flush
    }

    /// Registers a configuration-change listener.
    pub fn add_listener(&self, listener: Arc<dyn CacheConfigurationListener>) {
        self.listeners.write().push(listener);
    }

    /// Drops inactive listeners, then delivers one notification to the rest.
    fn notify(&self, notification: impl Fn(&dyn CacheConfigurationListener)) {
        let mut listeners = self.listeners.write();
        listeners.retain(|listener| listener.is_active());
        for listener in listeners.iter() {
            notification(listener.as_ref());
        }
    }

    /// Updates the in-memory capacity bound and notifies listeners.
    pub fn set_max_entries(&self, max_entries: usize) {
        let old = {
            let mut config = self.config.write();
            std::mem::replace(&mut config.max_entries, max_entries)
        };
        self.notify(|listener| listener.memory_capacity_changed(old, max_entries));
    }

    /// Updates the eviction policy and notifies listeners.
    ///
    /// Fails if the currently stored selector is itself invalid, which would
    /// indicate the store was never successfully constructed.
    pub fn set_eviction_policy(&self, kind: EvictionPolicyKind) -> Result<()> {
        let old = {
            let mut config = self.config.write();
            let old = EvictionPolicyKind::from_selector(&config.eviction_policy)?;
            config.eviction_policy = kind.as_str().to_string();
            old
        };
        self.notify(|listener| listener.eviction_policy_changed(old, kind));
        Ok(())
    }

    /// Updates the default time-to-live and notifies listeners.
    pub fn set_default_ttl(&self, ttl: u64) {
        let old = {
            let mut config = self.config.write();
            std::mem::replace(&mut config.default_ttl, ttl)
        };
        self.notify(|listener| listener.time_to_live_changed(old, ttl));
    }

    /// Updates the default time-to-idle and notifies listeners.
    pub fn set_default_tti(&self, tti: u64) {
        let old = {
            let mut config = self.config.write();
            std::mem::replace(&mut config.default_tti, tti)
        };
        self.notify(|listener| listener.time_to_idle_changed(old, tti));
    }

    /// Updates the logging flag and notifies listeners.
    pub fn set_logging(&self, logging: bool) {
        let old = {
            let mut config = self.config.write();
            std::mem::replace(&mut config.logging, logging)
        };
        self.notify(|listener| listener.logging_changed(old, logging));
    }

    /// Updates the clear-on-flush flag and notifies listeners.
    pub fn set_clear_on_flush(&self, clear_on_flush: bool) {
        let old = {
            let mut config = self.config.write();
            std::mem::replace(&mut config.clear_on_flush, clear_on_flush)
        };
        self.notify(|listener| listener.clear_on_flush_changed(old, clear_on_flush));
    }
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.eviction_policy, "lru");
        assert_eq!(config.default_ttl, 0);
        assert!(config.clear_on_flush);
        assert_eq!(config.cleanup_interval, 1);
    }

    #[test]
    fn test_policy_from_selector() {
        assert_eq!(
            EvictionPolicyKind::from_selector("lru").unwrap(),
            EvictionPolicyKind::Lru
        );
        assert_eq!(
            EvictionPolicyKind::from_selector("LFU").unwrap(),
            EvictionPolicyKind::Lfu
        );
        assert_eq!(
            EvictionPolicyKind::from_selector("fifo").unwrap(),
            EvictionPolicyKind::Fifo
        );
    }

    #[test]
    fn test_policy_from_unknown_selector() {
        let result = EvictionPolicyKind::from_selector("random");
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    struct CountingListener {
        capacity_changes: AtomicUsize,
        policy_changes: AtomicUsize,
    }

    impl CacheConfigurationListener for CountingListener {
        fn memory_capacity_changed(&self, _old: usize, _new: usize) {
            self.capacity_changes.fetch_add(1, Ordering::SeqCst);
        }

        fn eviction_policy_changed(&self, _old: EvictionPolicyKind, _new: EvictionPolicyKind) {
            self.policy_changes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_listener_notified_on_capacity_change() {
        let config = CacheConfiguration::default();
        let listener = Arc::new(CountingListener {
            capacity_changes: AtomicUsize::new(0),
            policy_changes: AtomicUsize::new(0),
        });
        config.add_listener(listener.clone());

        config.set_max_entries(5);
        config.set_eviction_policy(EvictionPolicyKind::Fifo).unwrap();

        assert_eq!(listener.capacity_changes.load(Ordering::SeqCst), 1);
        assert_eq!(listener.policy_changes.load(Ordering::SeqCst), 1);
        assert_eq!(config.snapshot().max_entries, 5);
        assert_eq!(config.snapshot().eviction_policy, "fifo");
    }

    struct DeactivatableListener {
        active: AtomicBool,
        notifications: AtomicUsize,
    }

    impl CacheConfigurationListener for DeactivatableListener {
        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }

        fn memory_capacity_changed(&self, _old: usize, _new: usize) {
            self.notifications.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_inactive_listeners_are_pruned() {
        let config = CacheConfiguration::default();
        let listener = Arc::new(DeactivatableListener {
            active: AtomicBool::new(true),
            notifications: AtomicUsize::new(0),
        });
        config.add_listener(listener.clone());

        config.set_max_entries(5);
        assert_eq!(listener.notifications.load(Ordering::SeqCst), 1);

        listener.active.store(false, Ordering::SeqCst);
        config.set_max_entries(6);

        // Pruned before delivery, and no longer registered at all
        assert_eq!(listener.notifications.load(Ordering::SeqCst), 1);
        assert_eq!(config.listeners.read().len(), 0);
    }

    #[test]
    fn test_unrelated_notifications_default_to_noops() {
        let config = CacheConfiguration::default();
        let listener = Arc::new(CountingListener {
            capacity_changes: AtomicUsize::new(0),
            policy_changes: AtomicUsize::new(0),
        });
        config.add_listener(listener.clone());

        config.set_default_ttl(60);
        config.set_default_tti(30);
        config.set_logging(true);
        config.set_clear_on_flush(false);

        assert_eq!(listener.capacity_changes.load(Ordering::SeqCst), 0);
        assert_eq!(listener.policy_changes.load(Ordering::SeqCst), 0);
        assert!(!config.clear_on_flush());
    }
}
