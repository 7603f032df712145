//! Per-scan-ID re-fetch throttling.
//!
//! Purely in-memory: a process restart resets throttling for all IDs.
//! The cache only governs whether the scheduler *attempts* a fetch; it
//! never gates reads from the store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// In-memory map of scan ID to the time it was last successfully
/// processed, gated by a configurable window (24h by default).
pub struct FetchThrottle {
    window: Duration,
    last_fetched: RwLock<HashMap<u32, Instant>>,
}

impl FetchThrottle {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fetched: RwLock::new(HashMap::new()),
        }
    }

    /// True when `scan_id` has never been processed, or its last record
    /// is older than the throttle window.
    #[must_use]
    pub fn should_fetch(&self, scan_id: u32) -> bool {
        match self.last_fetched.read().get(&scan_id) {
            Some(at) => at.elapsed() > self.window,
            None => true,
        }
    }

    /// Record that `scan_id` was processed now.
    pub fn mark_fetched(&self, scan_id: u32) {
        self.last_fetched.write().insert(scan_id, Instant::now());
    }

    /// Number of IDs currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_fetched.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_id_is_fetchable() {
        let throttle = FetchThrottle::new(Duration::from_secs(60));
        assert!(throttle.should_fetch(7));
    }

    #[test]
    fn marked_id_is_throttled_until_window_elapses() {
        let throttle = FetchThrottle::new(Duration::from_millis(30));
        throttle.mark_fetched(7);
        assert!(!throttle.should_fetch(7));
        std::thread::sleep(Duration::from_millis(40));
        assert!(throttle.should_fetch(7));
    }

    #[test]
    fn ids_are_throttled_independently() {
        let throttle = FetchThrottle::new(Duration::from_secs(60));
        throttle.mark_fetched(1);
        assert!(!throttle.should_fetch(1));
        assert!(throttle.should_fetch(2));
        assert_eq!(throttle.tracked(), 1);
    }
}
