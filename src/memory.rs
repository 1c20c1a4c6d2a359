//! System Memory Module
//!
//! Best-effort probe for free system memory. The reclaim task feeds the
//! reading into the eviction policy; a reading of 0 means "unavailable"
//! and the policy falls back to the configured default expiration.

/// Returns the free system memory in megabytes, or 0 if it cannot be
/// measured.
///
/// On Linux this reads `MemAvailable` from `/proc/meminfo`, falling back
/// to `MemFree` on older kernels. Other platforms always report 0; the
/// caller degrades to the default eviction policy rather than failing.
pub fn sys_free_memory_mb() -> u64 {
    #[cfg(target_os = "linux")]
    {
        use std::fs;
        if let Ok(contents) = fs::read_to_string("/proc/meminfo") {
            return parse_meminfo_mb(&contents);
        }
    }

    0
}

/// Extracts the free-memory figure in megabytes from `/proc/meminfo`
/// contents, 0 when neither field parses.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo_mb(contents: &str) -> u64 {
    // values are in kB, e.g. "MemAvailable:   16302040 kB"
    let field_kb = |name: &str| -> Option<u64> {
        contents
            .lines()
            .find(|line| line.starts_with(name))?
            .split_whitespace()
            .nth(1)?
            .parse::<u64>()
            .ok()
    };

    field_kb("MemAvailable:")
        .or_else(|| field_kb("MemFree:"))
        .map(|kb| kb / 1024)
        .unwrap_or(0)
}
