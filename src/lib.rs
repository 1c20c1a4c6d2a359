//! Presscache - An in-memory expiring cache with adaptive eviction
//!
//! Provides a value-or-error cache map with last-access tracking and a
//! background reclamation task whose eviction threshold adapts to system
//! memory pressure.

pub mod cache;
pub mod config;
pub mod memory;
pub mod tasks;

pub use cache::{CacheMap, CacheStats, SyncMap};
pub use config::ReclaimConfig;
pub use tasks::{spawn_reclaim_task, Reclaimer};
