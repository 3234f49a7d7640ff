//! Expiry Sweep Task
//!
//! Background task that periodically removes expired store entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically expires stale entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep is the same idempotent `expire_elements` call
/// a caller could make directly.
///
/// # Arguments
/// * `store` - The store to sweep (cheap clone of the shared interior)
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
pub fn spawn_expiry_task(store: MemoryStore, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.expire_elements();
            if removed > 0 {
                info!(removed, "expiry sweep removed entries");
            } else {
                debug!("expiry sweep found no expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfiguration;
    use serde_json::json;
    use std::sync::Arc;

    fn store() -> MemoryStore {
        let config = Arc::new(CacheConfiguration::default());
        MemoryStore::create(&config).unwrap()
    }

    #[tokio::test]
    async fn test_expiry_task_removes_expired_entries() {
        let store = store();
        store.put_with_ttl("expire_soon", json!(1), 1);

        let handle = spawn_expiry_task(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(!store.contains_key("expire_soon"));
        handle.abort();
    }

    #[tokio::test]
    async fn test_expiry_task_preserves_valid_entries() {
        let store = store();
        store.put_with_ttl("long_lived", json!(1), 3600);

        let handle = spawn_expiry_task(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("long_lived"), Some(json!(1)));
        handle.abort();
    }

    #[tokio::test]
    async fn test_expiry_task_can_be_aborted() {
        let handle = spawn_expiry_task(store(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished());
    }
}
