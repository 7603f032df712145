//! Crawler configuration.
//!
//! All timing knobs the sweep depends on (throttle window, tick interval,
//! inter-request delay, fetch timeout, render settle) are parameters with
//! documented defaults, not hard constants.

mod builder;

pub use builder::{Complete, ScoutConfigBuilder, WithStorageDir};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the store, fetcher, and scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Root of the persisted store (`agents/` + `agent_index.json`).
    ///
    /// **INVARIANT:** set through the builder; the debug subtree defaults
    /// to a sibling directory underneath it.
    pub(crate) storage_dir: PathBuf,
    pub(crate) base_url: String,
    pub(crate) debug_dir: Option<PathBuf>,
    pub(crate) agent_path_prefix: String,
    pub(crate) scan_start: u32,
    pub(crate) scan_max: u32,
    pub(crate) sweep_interval: Duration,
    pub(crate) refetch_window: Duration,
    pub(crate) inter_request_delay: Duration,
    pub(crate) fetch_timeout: Duration,
    pub(crate) render_settle: Duration,
    pub(crate) headless: bool,
}

impl ScoutConfig {
    /// Create a builder with a fluent interface; storage dir and base URL
    /// are required before `build` becomes available.
    #[must_use]
    pub fn builder() -> ScoutConfigBuilder<()> {
        ScoutConfigBuilder::default()
    }

    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Debug artifact directory; defaults to `<storage_dir>/debug`.
    #[must_use]
    pub fn debug_dir(&self) -> PathBuf {
        self.debug_dir
            .clone()
            .unwrap_or_else(|| self.storage_dir.join("debug"))
    }

    #[must_use]
    pub fn scan_start(&self) -> u32 {
        self.scan_start
    }

    #[must_use]
    pub fn scan_max(&self) -> u32 {
        self.scan_max
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    #[must_use]
    pub fn refetch_window(&self) -> Duration {
        self.refetch_window
    }

    #[must_use]
    pub fn inter_request_delay(&self) -> Duration {
        self.inter_request_delay
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[must_use]
    pub fn render_settle(&self) -> Duration {
        self.render_settle
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Deterministic profile endpoint for a scan ID.
    #[must_use]
    pub fn endpoint_for(&self, scan_id: u32) -> String {
        format!("{}/{scan_id}", self.agent_path_prefix)
    }
}
