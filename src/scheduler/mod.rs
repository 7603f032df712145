//! Periodic crawl scheduling.
//!
//! The scheduler owns the sweep loop: once per tick it walks the scan-ID
//! range, gates each ID through the fetch throttle, and runs
//! fetch -> extract -> save for the eligible ones. Per-ID failures are
//! absorbed (counted and logged) so one bad page never kills a sweep.
//! After the full range is scanned the summary index is rebuilt once from
//! that sweep's successes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::ScoutConfig;
use crate::extractor::Extractor;
use crate::fetcher::Fetcher;
use crate::models::Agent;
use crate::store::{AgentStore, FetchThrottle};

/// Outcome counts for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// IDs for which a fetch was actually attempted (throttled IDs are
    /// skipped and not counted)
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Set when the end-of-sweep index rebuild failed; the sweep itself
    /// still counts as complete
    pub index_error: Option<String>,
}

/// Periodic ID-range sweeper with injected store, fetcher, and extractor.
///
/// Lifecycle: construct, [`CrawlScheduler::start`] once, and
/// [`CrawlScheduler::stop`] (or [`CrawlScheduler::shutdown`]) during
/// process teardown. `stop` is safe to call before `start` and more than
/// once; an in-flight sweep runs to completion, bounded by the fetcher's
/// own timeout.
pub struct CrawlScheduler {
    config: ScoutConfig,
    store: Arc<AgentStore>,
    throttle: Arc<FetchThrottle>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    stopped: AtomicBool,
    stop_notify: Notify,
    sweep_active: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CrawlScheduler {
    #[must_use]
    pub fn new(
        config: ScoutConfig,
        store: Arc<AgentStore>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let throttle = Arc::new(FetchThrottle::new(config.refetch_window()));
        Self {
            config,
            store,
            throttle,
            fetcher,
            extractor,
            stopped: AtomicBool::new(false),
            stop_notify: Notify::new(),
            sweep_active: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// The throttle cache this scheduler consults.
    #[must_use]
    pub fn throttle(&self) -> &Arc<FetchThrottle> {
        &self.throttle
    }

    /// Spawn the tick loop onto the runtime. Calling `start` twice is a
    /// no-op with a warning.
    pub async fn start(self: &Arc<Self>) {
        let mut slot = self.task.lock().await;
        if slot.is_some() {
            warn!("scheduler already started, ignoring duplicate start");
            return;
        }

        let scheduler = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.config.sweep_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if scheduler.stopped.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    _ = interval.tick() => {
                        if scheduler.stopped.load(Ordering::SeqCst) {
                            break;
                        }
                        scheduler.run_sweep().await;
                    }
                    () = scheduler.stop_notify.notified() => break,
                }
            }
            info!("scheduler loop exited");
        }));
        info!(
            interval = ?self.config.sweep_interval(),
            range = ?(self.config.scan_start()..=self.config.scan_max()),
            "scheduler started"
        );
    }

    /// Prevent any future tick from starting a sweep. Safe to call even
    /// if the scheduler never started.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a stop issued while a sweep is
        // mid-flight still wakes the loop as soon as it returns to select
        self.stop_notify.notify_one();
    }

    /// Stop and wait for the loop (and any in-flight sweep) to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().await.take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            warn!("scheduler task join failed: {e}");
        }
    }

    /// Execute one full sweep over the configured ID range.
    ///
    /// Re-entrant invocations while a sweep is in flight are ignored and
    /// return an empty summary - a sweep never runs concurrently with
    /// itself.
    pub async fn run_sweep(&self) -> SweepSummary {
        if self.sweep_active.swap(true, Ordering::SeqCst) {
            warn!("sweep already in flight, ignoring trigger");
            return SweepSummary::default();
        }

        let summary = self.sweep_range().await;

        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            index_error = summary.index_error.as_deref(),
            "sweep complete"
        );

        self.sweep_active.store(false, Ordering::SeqCst);
        summary
    }

    async fn sweep_range(&self) -> SweepSummary {
        let mut summary = SweepSummary::default();
        let mut collected: Vec<Agent> = Vec::new();

        for scan_id in self.config.scan_start()..=self.config.scan_max() {
            if !self.throttle.should_fetch(scan_id) {
                continue;
            }
            summary.attempted += 1;

            let endpoint = self.config.endpoint_for(scan_id);
            let page = match self.fetcher.fetch(&endpoint).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(scan_id, "fetch failed: {e:#}");
                    summary.failed += 1;
                    self.pause().await;
                    continue;
                }
            };

            let agent = match self.extractor.extract(&page, scan_id) {
                Ok(agent) => agent,
                Err(e) => {
                    warn!(scan_id, "extraction failed: {e}");
                    summary.failed += 1;
                    self.pause().await;
                    continue;
                }
            };

            // Marked even when the content turns out unchanged: the
            // throttle tracks processing attempts per scan ID, not
            // content changes.
            self.throttle.mark_fetched(scan_id);

            match self.store.save(agent).await {
                Ok(saved) => {
                    summary.succeeded += 1;
                    collected.push(saved);
                }
                Err(e) => {
                    error!(scan_id, "save failed: {e}");
                    summary.failed += 1;
                }
            }

            self.pause().await;
        }

        // A zero-result sweep leaves the existing index untouched.
        if !collected.is_empty()
            && let Err(e) = self.store.rebuild_index(&collected).await
        {
            error!("index rebuild failed: {e}");
            summary.index_error = Some(e.to_string());
        }

        summary
    }

    /// Politeness pause between consecutive page loads within a sweep.
    async fn pause(&self) {
        tokio::time::sleep(self.config.inter_request_delay()).await;
    }
}
