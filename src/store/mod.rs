//! Store Module
//!
//! The capacity-limited in-memory store: entries, eviction policies,
//! statistics and the public compound-store facade.

mod element;
mod facade;
mod memory;
mod policy;
mod stats;


// Re-export public types
pub use element::Element;
pub use facade::MemoryStore;
pub use memory::CapacityLimitedStore;
pub use stats::CacheStats;

pub(crate) use policy::PolicyTracker;
