//! Eviction Policy Module
//!
//! Maps free system memory to an idle-time eviction threshold.

use std::time::Duration;

// == Memory Breakpoints (megabytes) ==
/// Below this, entries idle over 10 minutes are evicted
pub const LOW_MEMORY_MB: u64 = 200;
/// Below this, entries idle over 30 minutes are evicted
pub const SCARCE_MEMORY_MB: u64 = 500;
/// Below this, entries idle over 1 hour are evicted
pub const TIGHT_MEMORY_MB: u64 = 2000;
/// Above this, entries may idle up to 3 hours
pub const ROOMY_MEMORY_MB: u64 = 16000;
/// Above this, entries may idle up to 6 hours
pub const LARGE_MEMORY_MB: u64 = 32000;
/// Above this, entries may idle up to 12 hours
pub const VAST_MEMORY_MB: u64 = 64000;

/// Free-memory reading below which the reclaim task forces a full clear
pub const CRITICAL_MEMORY_MB: u64 = 10;

// == Eviction Threshold ==
/// Resolves the idle-time threshold for a reclamation pass from the
/// current free-memory reading.
///
/// A reading of `0` means the probe could not measure free memory; it is
/// excluded from every comparison and falls through to `default`. Readings
/// between 2000 MB and 16000 MB also fall through to `default`: the
/// breakpoints are kept exactly as the reference behavior defines them,
/// gap included, rather than smoothed into a curve.
///
/// # Arguments
/// * `free_mb` - Free system memory in megabytes, 0 meaning unavailable
/// * `default` - The cache's configured default expiration
pub fn eviction_threshold(free_mb: u64, default: Duration) -> Duration {
    if free_mb < LOW_MEMORY_MB && free_mb != 0 {
        Duration::from_secs(10 * 60)
    } else if free_mb < SCARCE_MEMORY_MB && free_mb != 0 {
        Duration::from_secs(30 * 60)
    } else if free_mb < TIGHT_MEMORY_MB && free_mb != 0 {
        Duration::from_secs(60 * 60)
    } else if free_mb > VAST_MEMORY_MB {
        Duration::from_secs(12 * 60 * 60)
    } else if free_mb > LARGE_MEMORY_MB {
        Duration::from_secs(6 * 60 * 60)
    } else if free_mb > ROOMY_MEMORY_MB {
        Duration::from_secs(3 * 60 * 60)
    } else {
        default
    }
}
