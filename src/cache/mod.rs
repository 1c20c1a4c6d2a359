//! Cache Module
//!
//! Provides in-memory key-value caching with last-access tracking and
//! memory-pressure-adaptive eviction, plus a plain thread-safe map for
//! callers that do not need expiration.

mod entry;
mod map;
pub mod policy;
mod stats;
mod sync_map;


// Re-export public types
pub use entry::CacheEntry;
pub use map::CacheMap;
pub use stats::CacheStats;
pub use sync_map::SyncMap;
