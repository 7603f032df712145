//! End-to-end sweep behavior with a scripted fetcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use agentwatch::{
    AgentStore, CrawlScheduler, FetchError, Fetcher, RenderedPage, ScoutConfig,
    VirtualsExtractor,
};

/// Serves canned HTML per endpoint; unknown endpoints time out.
struct ScriptedFetcher {
    pages: HashMap<String, String>,
}

impl ScriptedFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(endpoint, html)| ((*endpoint).to_string(), (*html).to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, endpoint: &str) -> Result<RenderedPage, FetchError> {
        let url = format!("https://example.test{endpoint}");
        match self.pages.get(endpoint) {
            Some(html) => Ok(RenderedPage {
                url,
                endpoint: endpoint.to_string(),
                title: "Virtuals".to_string(),
                html: html.clone(),
            }),
            None => Err(FetchError::Timeout {
                url,
                timeout: Duration::from_secs(55),
            }),
        }
    }
}

fn profile(name: &str, price: &str) -> String {
    format!(
        r#"<html><body>
          <h1 class="agent-name">{name}</h1>
          <div class="agent-price">{price}</div>
          <div class="agent-description">A scripted profile.</div>
        </body></html>"#
    )
}

fn test_config(dir: &TempDir, refetch_window: Duration) -> ScoutConfig {
    ScoutConfig::builder()
        .storage_dir(dir.path())
        .base_url("https://example.test")
        .scan_range(1, 3)
        .inter_request_delay(Duration::ZERO)
        .refetch_window(refetch_window)
        .build()
        .unwrap()
}

fn scheduler_with(
    dir: &TempDir,
    fetcher: ScriptedFetcher,
    refetch_window: Duration,
) -> (Arc<CrawlScheduler>, Arc<AgentStore>) {
    let store = Arc::new(AgentStore::new(dir.path()));
    let scheduler = Arc::new(CrawlScheduler::new(
        test_config(dir, refetch_window),
        Arc::clone(&store),
        Arc::new(fetcher),
        Arc::new(VirtualsExtractor::new()),
    ));
    (scheduler, store)
}

#[tokio::test]
async fn sweep_absorbs_one_failure_and_indexes_the_rest() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(&[
        ("/virtuals/1", &profile("Alpha", "$1.00")),
        // ID 2 deliberately missing: its fetch times out
        ("/virtuals/3", &profile("Gamma", "$3.00")),
    ]);
    let (scheduler, store) = scheduler_with(&dir, fetcher, Duration::from_secs(3600));

    let summary = scheduler.run_sweep().await;
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.index_error.is_none());

    let index = store.get_index().await.unwrap();
    assert_eq!(index.agents.len(), 2);
    assert_eq!(index.agents[0].name, "Alpha");
    assert_eq!(index.agents[1].name, "Gamma");
}

#[tokio::test]
async fn sweep_skips_extraction_failures_without_marking_the_throttle() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(&[
        ("/virtuals/1", &profile("Alpha", "$1.00")),
        ("/virtuals/2", "<html><body><p>no name anywhere</p></body></html>"),
        ("/virtuals/3", &profile("Gamma", "$3.00")),
    ]);
    let (scheduler, _store) = scheduler_with(&dir, fetcher, Duration::from_secs(3600));

    let summary = scheduler.run_sweep().await;
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    // Successful IDs were marked; the failed one stays eligible.
    assert!(!scheduler.throttle().should_fetch(1));
    assert!(scheduler.throttle().should_fetch(2));
    assert!(!scheduler.throttle().should_fetch(3));
}

#[tokio::test]
async fn throttled_ids_are_skipped_in_the_next_sweep() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(&[
        ("/virtuals/1", &profile("Alpha", "$1.00")),
        ("/virtuals/2", &profile("Beta", "$2.00")),
        ("/virtuals/3", &profile("Gamma", "$3.00")),
    ]);
    let (scheduler, store) = scheduler_with(&dir, fetcher, Duration::from_secs(3600));

    let first = scheduler.run_sweep().await;
    assert_eq!(first.succeeded, 3);

    let second = scheduler.run_sweep().await;
    assert_eq!(second.attempted, 0);
    assert_eq!(second.succeeded, 0);

    // The zero-result sweep left the index from the first sweep intact.
    let index = store.get_index().await.unwrap();
    assert_eq!(index.agents.len(), 3);
}

#[tokio::test]
async fn refetch_of_unchanged_pages_does_not_bump_update_counts() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(&[("/virtuals/1", &profile("Alpha", "$1.00"))]);
    // Zero throttle window: every sweep re-fetches every ID.
    let (scheduler, store) = scheduler_with(&dir, fetcher, Duration::ZERO);

    scheduler.run_sweep().await;
    let id = store.get_index().await.unwrap().agents[0].id.clone();
    assert_eq!(store.get(&id).await.unwrap().update_count, 1);

    scheduler.run_sweep().await;
    assert_eq!(store.get(&id).await.unwrap().update_count, 1);
}

#[tokio::test]
async fn stop_is_safe_before_start_and_idempotent() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(&[]);
    let (scheduler, _store) = scheduler_with(&dir, fetcher, Duration::from_secs(3600));

    scheduler.stop();
    scheduler.stop();
    scheduler.shutdown().await;
}

#[tokio::test]
async fn started_scheduler_shuts_down_cleanly() {
    let dir = TempDir::new().unwrap();
    let fetcher = ScriptedFetcher::new(&[("/virtuals/1", &profile("Alpha", "$1.00"))]);
    let (scheduler, store) = scheduler_with(&dir, fetcher, Duration::from_secs(3600));

    scheduler.start().await;
    // First tick fires immediately; give the sweep a moment to land.
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.shutdown().await;

    let index = store.get_index().await.unwrap();
    assert_eq!(index.agents.len(), 1);
}
