//! Background Tasks Module
//!
//! Periodic maintenance tasks run alongside the store.
//!
//! # Tasks
//! - Expiry sweep: removes TTL/TTI-expired entries at configured intervals

mod cleanup;

pub use cleanup::spawn_expiry_task;
