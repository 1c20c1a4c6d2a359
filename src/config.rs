//! Configuration Module
//!
//! Handles loading reclamation parameters from environment variables.

use std::env;
use std::time::Duration;

/// Reclamation task configuration.
///
/// All values can be configured via environment variables with defaults
/// matching the reference behavior: a 10 minute sweep interval, a 10
/// second settle delay before the critical-pressure recheck, and a 2 hour
/// default expiration.
#[derive(Debug, Clone)]
pub struct ReclaimConfig {
    /// Time between reclamation passes
    pub interval: Duration,
    /// Delay between a pass and the critical-pressure recheck
    pub settle_delay: Duration,
    /// Default expiration for caches built from this config
    pub default_expiration: Duration,
}

impl ReclaimConfig {
    /// Creates a new ReclaimConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `RECLAIM_INTERVAL_SECS` - Seconds between passes (default: 600)
    /// - `RECLAIM_SETTLE_SECS` - Seconds before the critical recheck (default: 10)
    /// - `DEFAULT_EXPIRATION_SECS` - Default expiration in seconds (default: 7200)
    pub fn from_env() -> Self {
        Self {
            interval: Duration::from_secs(
                env::var("RECLAIM_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(600),
            ),
            settle_delay: Duration::from_secs(
                env::var("RECLAIM_SETTLE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            default_expiration: Duration::from_secs(
                env::var("DEFAULT_EXPIRATION_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(7200),
            ),
        }
    }
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            settle_delay: Duration::from_secs(10),
            default_expiration: Duration::from_secs(7200),
        }
    }
}
