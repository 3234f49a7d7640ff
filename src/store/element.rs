//! Element Module
//!
//! Defines the structure for individual store entries with access metadata
//! and TTL/TTI expiry support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Element ==
/// A single key/value entry held by the store.
///
/// Carries the implicit metadata the eviction policies and expiry sweep
/// consume: creation time, last-access time and hit count. Owned exclusively
/// by the backing map; created on put, replaced on put-with-existing-key,
/// destroyed on remove/evict/clear.
#[derive(Debug, Clone)]
pub struct Element {
    /// The entry key
    key: String,
    /// The stored value
    value: Value,
    /// Creation timestamp (Unix milliseconds)
    created_at: u64,
    /// Last access timestamp (Unix milliseconds)
    last_accessed_at: u64,
    /// Number of times this entry has been read
    hit_count: u64,
    /// Expiration timestamp (Unix milliseconds), None = no TTL
    expires_at: Option<u64>,
    /// Maximum idle window (milliseconds), None = no TTI
    idle_ms: Option<u64>,
}

impl Element {
    // == Constructor ==
    /// Creates a new element with optional TTL and TTI, both in seconds.
    pub fn new(key: String, value: Value, ttl_seconds: Option<u64>, tti_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        Self {
            key,
            value,
            created_at: now,
            last_accessed_at: now,
            hit_count: 0,
            // Saturate so an absurdly large window means "effectively never"
            expires_at: ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000))),
            idle_ms: tti_seconds.map(|tti| tti.saturating_mul(1000)),
        }
    }

    // == Accessors ==
    /// Returns the entry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the creation timestamp in Unix milliseconds.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Returns the last access timestamp in Unix milliseconds.
    pub fn last_accessed_at(&self) -> u64 {
        self.last_accessed_at
    }

    /// Returns the number of reads this entry has served.
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    // == Touch ==
    /// Records a read: refreshes the last-access time and hit count.
    pub fn touch(&mut self) {
        self.last_accessed_at = current_timestamp_ms();
        self.hit_count += 1;
    }

    // == Is Expired ==
    /// Checks whether the entry's TTL or idle window has elapsed.
    ///
    /// Boundary condition: expired when the current time is greater than or
    /// equal to the expiry instant, so an entry is expired the moment its
    /// window has fully elapsed.
    pub fn is_expired(&self) -> bool {
        let now = current_timestamp_ms();
        if let Some(expires) = self.expires_at {
            if now >= expires {
                return true;
            }
        }
        if let Some(idle) = self.idle_ms {
            if now >= self.last_accessed_at.saturating_add(idle) {
                return true;
            }
        }
        false
    }

    // == Estimated Size ==
    /// Estimates this entry's in-memory footprint in bytes.
    ///
    /// The estimate covers key bytes, a recursive walk of the JSON value and
    /// a fixed per-entry overhead; it feeds the store's byte-size accessor,
    /// not an allocator-accurate accounting.
    pub fn estimated_size(&self) -> usize {
        const ENTRY_OVERHEAD: usize = 64;
        ENTRY_OVERHEAD + self.key.len() + json_size(&self.value)
    }
}

/// Recursive JSON footprint estimate.
fn json_size(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 8,
        Value::String(s) => s.len(),
        Value::Array(items) => items.iter().map(json_size).sum::<usize>() + 8,
        Value::Object(map) => {
            map.iter()
                .map(|(k, v)| k.len() + json_size(v))
                .sum::<usize>()
                + 8
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_element_creation_no_expiry() {
        let element = Element::new("k".to_string(), json!("v"), None, None);

        assert_eq!(element.key(), "k");
        assert_eq!(element.value(), &json!("v"));
        assert_eq!(element.hit_count(), 0);
        assert!(!element.is_expired());
    }

    #[test]
    fn test_element_ttl_expiration() {
        let element = Element::new("k".to_string(), json!("v"), Some(1), None);

        assert!(!element.is_expired());
        sleep(Duration::from_millis(1100));
        assert!(element.is_expired());
    }

    #[test]
    fn test_element_tti_expiration_reset_by_touch() {
        let mut element = Element::new("k".to_string(), json!("v"), None, Some(1));

        sleep(Duration::from_millis(600));
        element.touch();
        sleep(Duration::from_millis(600));
        // idle window was reset by the touch
        assert!(!element.is_expired());

        sleep(Duration::from_millis(600));
        assert!(element.is_expired());
    }

    #[test]
    fn test_touch_updates_metadata() {
        let mut element = Element::new("k".to_string(), json!("v"), None, None);
        let before = element.last_accessed_at();

        sleep(Duration::from_millis(5));
        element.touch();

        assert_eq!(element.hit_count(), 1);
        assert!(element.last_accessed_at() >= before);
    }

    #[test]
    fn test_huge_expiry_windows_saturate() {
        let ttl = Element::new("k".to_string(), json!("v"), Some(u64::MAX), None);
        let tti = Element::new("k".to_string(), json!("v"), None, Some(u64::MAX));

        assert_eq!(ttl.expires_at, Some(u64::MAX));
        assert!(!ttl.is_expired());
        assert!(!tti.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let mut element = Element::new("k".to_string(), json!("v"), None, None);
        element.expires_at = Some(element.created_at);
        assert!(element.is_expired(), "entry should be expired at boundary");
    }

    #[test]
    fn test_estimated_size_grows_with_value() {
        let small = Element::new("k".to_string(), json!({"a": 1}), None, None);
        let large = Element::new(
            "k".to_string(),
            json!({"a": "x".repeat(1024)}),
            None,
            None,
        );
        assert!(large.estimated_size() > small.estimated_size());
    }
}
