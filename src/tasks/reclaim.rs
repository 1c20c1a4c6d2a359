//! Adaptive Reclamation Task
//!
//! Background task that periodically shrinks a cache based on idle time
//! and current system memory pressure.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::policy::{eviction_threshold, CRITICAL_MEMORY_MB};
use crate::cache::CacheMap;
use crate::config::ReclaimConfig;
use crate::memory;

// == Reclaimer ==
/// One reclamation step over a cache, with an injectable free-memory probe.
///
/// A step resolves the eviction threshold from the probe reading and the
/// cache's current default expiration, evicts idle entries, waits a settle
/// delay, then re-probes and force-clears the cache if memory is still
/// critically low.
///
/// Callers who want to control scheduling (for example when many caches
/// exist and one timer should drive them all) hold a `Reclaimer` and call
/// [`tick`](Reclaimer::tick) themselves; [`spawn_reclaim_task`] is the
/// owned-background-task alternative.
pub struct Reclaimer<K, V, E, P = fn() -> u64>
where
    P: Fn() -> u64,
{
    cache: CacheMap<K, V, E>,
    settle_delay: Duration,
    probe: P,
}

impl<K, V, E> Reclaimer<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    /// Creates a reclaimer backed by the real system memory probe.
    pub fn new(cache: CacheMap<K, V, E>, config: &ReclaimConfig) -> Self {
        Self::with_probe(cache, config, memory::sys_free_memory_mb)
    }
}

impl<K, V, E, P> Reclaimer<K, V, E, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
    P: Fn() -> u64,
{
    /// Creates a reclaimer with a custom free-memory probe.
    ///
    /// The probe returns free memory in megabytes, 0 meaning unavailable.
    pub fn with_probe(cache: CacheMap<K, V, E>, config: &ReclaimConfig, probe: P) -> Self {
        Self {
            cache,
            settle_delay: config.settle_delay,
            probe,
        }
    }

    /// Runs one reclamation pass.
    ///
    /// A resolved threshold of zero skips the pass entirely; that only
    /// happens when the cache's default expiration is itself zero and the
    /// probe reports no pressure branch.
    pub async fn tick(&self) {
        let free_mb = (self.probe)();
        let threshold = eviction_threshold(free_mb, self.cache.expiration());

        if threshold.is_zero() {
            debug!("reclaim: expiration disabled, skipping pass");
            return;
        }

        let removed = self.cache.del_old(threshold);
        if removed > 0 {
            info!(
                "reclaim: removed {} entries idle over {:?} (free memory: {} MB)",
                removed, threshold, free_mb
            );
        } else {
            debug!(
                "reclaim: no entries idle over {:?} (free memory: {} MB)",
                threshold, free_mb
            );
        }

        // let the sweep settle before judging memory pressure again
        tokio::time::sleep(self.settle_delay).await;

        let free_mb = (self.probe)();
        if free_mb < CRITICAL_MEMORY_MB && free_mb != 0 {
            let removed = self.cache.del_old(Duration::ZERO);
            warn!(
                "reclaim: critically low memory ({} MB free), cleared {} entries",
                free_mb, removed
            );
        }
    }
}

// == Spawn ==
/// Spawns a background task that runs one reclamation pass per interval
/// against the real system memory probe.
///
/// The returned `JoinHandle` is the lifecycle handle: abort it during
/// shutdown, or when the cache is no longer needed.
///
/// # Example
/// ```ignore
/// let cache: CacheMap<String, String, String> = CacheMap::new(Duration::from_secs(7200));
/// let handle = spawn_reclaim_task(cache.clone(), ReclaimConfig::default());
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_reclaim_task<K, V, E>(
    cache: CacheMap<K, V, E>,
    config: ReclaimConfig,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let interval = config.interval;
    let reclaimer = Reclaimer::new(cache, &config);

    tokio::spawn(async move {
        info!(
            "starting reclaim task with interval of {:?} and settle delay of {:?}",
            interval, reclaimer.settle_delay
        );

        loop {
            tokio::time::sleep(interval).await;
            reclaimer.tick().await;
        }
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Cache = CacheMap<String, String, String>;

    fn test_config() -> ReclaimConfig {
        ReclaimConfig {
            interval: Duration::from_millis(20),
            settle_delay: Duration::from_millis(10),
            default_expiration: Duration::from_millis(30),
        }
    }

    #[tokio::test]
    async fn test_tick_uses_default_when_probe_unavailable() {
        let config = test_config();
        let cache = Cache::new(config.default_expiration);
        cache.set("stale".to_string(), Ok("v".to_string()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.set("fresh".to_string(), Ok("v".to_string()));

        // sentinel reading: no pressure branch applies, default (30ms) rules
        let reclaimer = Reclaimer::with_probe(cache.clone(), &config, || 0);
        reclaimer.tick().await;

        assert_eq!(cache.get(&"stale".to_string()), None);
        assert!(cache.has(&"fresh".to_string()));
    }

    #[tokio::test]
    async fn test_tick_midrange_memory_uses_default() {
        let cache = Cache::new(Duration::from_millis(30));
        cache.set("stale".to_string(), Ok("v".to_string()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // 8000 MB falls in the breakpoint gap and resolves to the default
        let reclaimer = Reclaimer::with_probe(cache.clone(), &test_config(), || 8000);
        reclaimer.tick().await;

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_tick_low_memory_overrides_default_threshold() {
        // default expiration of 30ms would evict, but a 100 MB reading
        // resolves to the 10 minute low-memory threshold instead
        let cache = Cache::new(Duration::from_millis(30));
        cache.set("idle".to_string(), Ok("v".to_string()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let reclaimer = Reclaimer::with_probe(cache.clone(), &test_config(), || 100);
        reclaimer.tick().await;

        assert!(cache.has(&"idle".to_string()));
    }

    #[tokio::test]
    async fn test_tick_zero_threshold_skips_pass() {
        let cache = Cache::new(Duration::ZERO);
        cache.set("k".to_string(), Ok("v".to_string()));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let reclaimer = Reclaimer::with_probe(cache.clone(), &test_config(), || 0);
        reclaimer.tick().await;

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_tick_critical_recheck_clears_cache() {
        let cache = Cache::new(Duration::from_secs(3600));
        cache.set("a".to_string(), Ok("1".to_string()));
        cache.set("b".to_string(), Ok("2".to_string()));

        // first probe: plenty of memory, nothing is idle enough to evict;
        // recheck probe: 5 MB free forces the full clear
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();
        let probe = move || {
            if probe_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                8000
            } else {
                5
            }
        };

        let reclaimer = Reclaimer::with_probe(cache.clone(), &test_config(), probe);
        reclaimer.tick().await;

        assert!(cache.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_tick_critical_sentinel_does_not_clear() {
        let cache = Cache::new(Duration::from_secs(3600));
        cache.set("k".to_string(), Ok("v".to_string()));

        // an unavailable recheck reading must never trigger the full clear
        let calls = Arc::new(AtomicUsize::new(0));
        let probe_calls = calls.clone();
        let probe = move || {
            if probe_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                8000
            } else {
                0
            }
        };

        let reclaimer = Reclaimer::with_probe(cache.clone(), &test_config(), probe);
        reclaimer.tick().await;

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_task_can_be_aborted() {
        let cache = Cache::new(Duration::from_secs(3600));
        let handle = spawn_reclaim_task(cache, test_config());

        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "task should be finished after abort");
    }

    #[tokio::test]
    async fn test_spawned_task_preserves_recent_entries() {
        let cache = Cache::new(Duration::from_secs(3600));
        cache.set("recent".to_string(), Ok("v".to_string()));

        let handle = spawn_reclaim_task(cache.clone(), test_config());
        tokio::time::sleep(Duration::from_millis(80)).await;

        // whatever the real memory reading, a just-written entry survives
        assert!(cache.has(&"recent".to_string()));
        handle.abort();
    }
}
