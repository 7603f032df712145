//! Shared configuration constants for agentwatch
//!
//! Default values used throughout the codebase to ensure consistency
//! and avoid magic numbers. Every one of these can be overridden through
//! `ScoutConfig`.

use std::time::Duration;

/// Default sweep interval: one minute
///
/// How often the scheduler wakes up and scans the configured ID range.
/// The per-ID throttle window (not this interval) decides which IDs are
/// actually fetched, so a short tick is cheap when nothing is eligible.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default re-fetch throttle window: 24 hours
///
/// Minimum time between two fetch attempts for the same scan ID. The
/// throttle map is in-memory only; a process restart resets it.
pub const DEFAULT_REFETCH_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Default inter-request delay: 500ms
///
/// Politeness pause between consecutive page fetches inside one sweep.
/// This is the primary rate control; the 24h throttle only governs how
/// often a given ID becomes eligible again.
pub const DEFAULT_INTER_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Default overall fetch timeout: 55 seconds
///
/// Upper bound for one complete browser fetch (launch, navigation,
/// render wait, capture). Chosen to stay below typical 60s upstream
/// proxy timeouts while still tolerating slow client-side rendering.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(55);

/// Default render settle delay: 5 seconds
///
/// Fixed pause after the page body becomes visible, giving client-side
/// frameworks time to populate the profile widgets before capture.
pub const DEFAULT_RENDER_SETTLE: Duration = Duration::from_secs(5);

/// Default scan range start
pub const DEFAULT_SCAN_START: u32 = 1;

/// Default scan range end (inclusive)
///
/// The upstream app exposes a few hundred live profile IDs; 200 covers
/// the populated range without hammering the long empty tail.
pub const DEFAULT_SCAN_MAX: u32 = 200;

/// Chrome user agent string for stealth mode
///
/// Chrome releases new stable versions ~every 4 weeks; update this
/// occasionally to stay within a reasonable version window.
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
