//! Type-safe builder for `ScoutConfig` using the typestate pattern.
//!
//! The two required fields (storage dir, then base URL) advance the
//! builder's type state; `build` only exists once both are set, so a
//! config can never be constructed without them.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use super::ScoutConfig;
use crate::utils::constants::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_INTER_REQUEST_DELAY, DEFAULT_REFETCH_WINDOW,
    DEFAULT_RENDER_SETTLE, DEFAULT_SCAN_MAX, DEFAULT_SCAN_START, DEFAULT_SWEEP_INTERVAL,
};

// Type states for the builder
pub struct WithStorageDir;
pub struct Complete;

pub struct ScoutConfigBuilder<State = ()> {
    storage_dir: Option<PathBuf>,
    base_url: Option<String>,
    debug_dir: Option<PathBuf>,
    agent_path_prefix: String,
    scan_start: u32,
    scan_max: u32,
    sweep_interval: Duration,
    refetch_window: Duration,
    inter_request_delay: Duration,
    fetch_timeout: Duration,
    render_settle: Duration,
    headless: bool,
    _phantom: PhantomData<State>,
}

impl Default for ScoutConfigBuilder<()> {
    fn default() -> Self {
        Self {
            storage_dir: None,
            base_url: None,
            debug_dir: None,
            agent_path_prefix: "/virtuals".to_string(),
            scan_start: DEFAULT_SCAN_START,
            scan_max: DEFAULT_SCAN_MAX,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            refetch_window: DEFAULT_REFETCH_WINDOW,
            inter_request_delay: DEFAULT_INTER_REQUEST_DELAY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            render_settle: DEFAULT_RENDER_SETTLE,
            headless: true,
            _phantom: PhantomData,
        }
    }
}

impl<State> ScoutConfigBuilder<State> {
    fn transition<Next>(self) -> ScoutConfigBuilder<Next> {
        ScoutConfigBuilder {
            storage_dir: self.storage_dir,
            base_url: self.base_url,
            debug_dir: self.debug_dir,
            agent_path_prefix: self.agent_path_prefix,
            scan_start: self.scan_start,
            scan_max: self.scan_max,
            sweep_interval: self.sweep_interval,
            refetch_window: self.refetch_window,
            inter_request_delay: self.inter_request_delay,
            fetch_timeout: self.fetch_timeout,
            render_settle: self.render_settle,
            headless: self.headless,
            _phantom: PhantomData,
        }
    }

    /// Override the debug artifact directory.
    #[must_use]
    pub fn debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Path prefix the scan ID is appended to.
    #[must_use]
    pub fn agent_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.agent_path_prefix = prefix.into();
        self
    }

    /// Closed scan range `[start, max]`.
    #[must_use]
    pub fn scan_range(mut self, start: u32, max: u32) -> Self {
        self.scan_start = start;
        self.scan_max = max;
        self
    }

    #[must_use]
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Minimum time between two fetch attempts for the same scan ID.
    #[must_use]
    pub fn refetch_window(mut self, window: Duration) -> Self {
        self.refetch_window = window;
        self
    }

    /// Politeness pause between consecutive page loads within a sweep.
    #[must_use]
    pub fn inter_request_delay(mut self, delay: Duration) -> Self {
        self.inter_request_delay = delay;
        self
    }

    /// Overall bound for one complete browser fetch.
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fixed pause after the page body becomes visible.
    #[must_use]
    pub fn render_settle(mut self, settle: Duration) -> Self {
        self.render_settle = settle;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl ScoutConfigBuilder<()> {
    #[must_use]
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> ScoutConfigBuilder<WithStorageDir> {
        self.storage_dir = Some(dir.into());
        self.transition()
    }
}

impl ScoutConfigBuilder<WithStorageDir> {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> ScoutConfigBuilder<Complete> {
        self.base_url = Some(url.into());
        self.transition()
    }
}

impl ScoutConfigBuilder<Complete> {
    /// Validate and build the final configuration.
    ///
    /// The base URL is normalized (scheme defaulted to https, trailing
    /// slash removed) so `endpoint_for` concatenation stays unambiguous.
    pub fn build(self) -> Result<ScoutConfig> {
        let storage_dir = self
            .storage_dir
            .ok_or_else(|| anyhow!("storage_dir is required"))?;
        let base_url = self
            .base_url
            .ok_or_else(|| anyhow!("base_url is required"))?;

        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow!("base_url must not be empty"));
        }
        let mut base_url = if base_url.contains("://") {
            base_url.to_string()
        } else {
            format!("https://{base_url}")
        };
        while base_url.ends_with('/') {
            base_url.pop();
        }

        if self.scan_start > self.scan_max {
            return Err(anyhow!(
                "scan range start {} exceeds max {}",
                self.scan_start,
                self.scan_max
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(anyhow!("sweep_interval must be non-zero"));
        }

        Ok(ScoutConfig {
            storage_dir,
            base_url,
            debug_dir: self.debug_dir,
            agent_path_prefix: self.agent_path_prefix,
            scan_start: self.scan_start,
            scan_max: self.scan_max,
            sweep_interval: self.sweep_interval,
            refetch_window: self.refetch_window,
            inter_request_delay: self.inter_request_delay,
            fetch_timeout: self.fetch_timeout,
            render_settle: self.render_settle,
            headless: self.headless,
        })
    }
}
