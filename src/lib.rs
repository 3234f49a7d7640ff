//! querycache - An embeddable in-memory cache store with a query engine
//!
//! Holds key/value entries under a capacity bound enforced by a pluggable
//! eviction policy (LRU, LFU or FIFO), and exposes an embedded query engine
//! that can filter, order, window and aggregate over the live entry set
//! without external indexing infrastructure.

pub mod config;
pub mod error;
pub mod query;
pub mod store;
pub mod tasks;

pub use config::{CacheConfig, CacheConfiguration, CacheConfigurationListener, EvictionPolicyKind};
pub use error::{Result, StoreError};
pub use query::{
    json_field_extractor, Aggregation, AggregateValue, AttributeValue, Criteria, Direction,
    Results, StoreQuery,
};
pub use store::{CacheStats, MemoryStore};
pub use tasks::spawn_expiry_task;
