//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with last-access tracking.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: an optional value-or-error slot plus the time it
/// was last accessed.
///
/// The slot holds at most one of a value or a stored error at any time,
/// which the `Result` representation enforces structurally. A slot of
/// `None` is a reservation: created by touching an absent key, it carries
/// only a last-access time and is invisible to lookups.
#[derive(Debug, Clone)]
pub struct CacheEntry<V, E> {
    /// Stored outcome: `Ok` for a value, `Err` for a stored error,
    /// `None` for a touch-only reservation
    pub slot: Option<Result<V, E>>,
    /// When this entry was last read, written, or touched
    pub last_access: Instant,
}

impl<V, E> CacheEntry<V, E> {
    // == Constructors ==
    /// Creates an entry holding a value or a stored error.
    pub fn new(outcome: Result<V, E>) -> Self {
        Self {
            slot: Some(outcome),
            last_access: Instant::now(),
        }
    }

    /// Creates a reservation entry with no value, only a last-access time.
    pub fn reservation() -> Self {
        Self {
            slot: None,
            last_access: Instant::now(),
        }
    }

    // == Touch ==
    /// Refreshes the last-access time to now.
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    // == Idle Time ==
    /// Returns how long ago this entry was last accessed.
    pub fn idle(&self) -> Duration {
        self.last_access.elapsed()
    }

    /// Checks whether the entry has been idle for longer than `threshold`.
    ///
    /// A threshold of zero never matches here; callers treat zero as the
    /// unconditional "clear everything" case before consulting idle times.
    pub fn idle_longer_than(&self, threshold: Duration) -> bool {
        !threshold.is_zero() && self.idle() > threshold
    }

    // == Slot Queries ==
    /// True if the entry holds a value (not a stored error, not a reservation).
    pub fn has_value(&self) -> bool {
        matches!(self.slot, Some(Ok(_)))
    }

    /// True if the entry holds a stored error.
    pub fn has_err(&self) -> bool {
        matches!(self.slot, Some(Err(_)))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    type Entry = CacheEntry<String, String>;

    #[test]
    fn test_entry_value_slot() {
        let entry = Entry::new(Ok("v".to_string()));
        assert!(entry.has_value());
        assert!(!entry.has_err());
    }

    #[test]
    fn test_entry_err_slot() {
        let entry = Entry::new(Err("boom".to_string()));
        assert!(entry.has_err());
        assert!(!entry.has_value());
    }

    #[test]
    fn test_entry_reservation() {
        let entry = Entry::reservation();
        assert!(entry.slot.is_none());
        assert!(!entry.has_value());
        assert!(!entry.has_err());
    }

    #[test]
    fn test_entry_idle_grows() {
        let entry = Entry::new(Ok("v".to_string()));
        sleep(Duration::from_millis(20));
        assert!(entry.idle() >= Duration::from_millis(20));
    }

    #[test]
    fn test_entry_touch_resets_idle() {
        let mut entry = Entry::new(Ok("v".to_string()));
        sleep(Duration::from_millis(20));
        entry.touch();
        assert!(entry.idle() < Duration::from_millis(20));
    }

    #[test]
    fn test_idle_longer_than() {
        let entry = Entry::new(Ok("v".to_string()));
        sleep(Duration::from_millis(20));
        assert!(entry.idle_longer_than(Duration::from_millis(5)));
        assert!(!entry.idle_longer_than(Duration::from_secs(60)));
    }

    #[test]
    fn test_idle_longer_than_zero_never_matches() {
        let entry = Entry::new(Ok("v".to_string()));
        sleep(Duration::from_millis(5));
        // zero is the "clear all" sentinel, handled before idle checks
        assert!(!entry.idle_longer_than(Duration::ZERO));
    }
}
