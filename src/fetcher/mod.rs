//! Headless-browser page fetching.
//!
//! One fetch = one isolated Chromium session: navigate, wait for the body
//! to become visible, let client-side rendering settle, then capture the
//! rendered HTML, a screenshot, and the page title. The whole operation
//! is bounded by a single overall timeout; callers never receive a
//! half-rendered page.

pub mod browser;
mod debug_capture;

pub use browser::{BrowserSession, download_managed_browser, find_browser_executable};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fetch failure. Every variant carries the underlying cause; a timeout
/// aborts the in-flight browser work via the enclosing `tokio::time::timeout`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch browser")]
    Launch(#[source] anyhow::Error),
    #[error("navigation to {url} failed")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("render capture failed for {url}")]
    Render {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("fetch of {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
}

/// A fully rendered page as handed to the extractor.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub endpoint: String,
    pub title: String,
    pub html: String,
}

/// Capability seam between the scheduler and the browser layer.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Render `base_url + endpoint` and return the captured page.
    async fn fetch(&self, endpoint: &str) -> Result<RenderedPage, FetchError>;
}

/// Chromium-backed fetcher with per-invocation session isolation.
pub struct ChromiumFetcher {
    base_url: String,
    debug_dir: PathBuf,
    headless: bool,
    timeout: Duration,
    settle: Duration,
}

impl ChromiumFetcher {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        debug_dir: impl Into<PathBuf>,
        headless: bool,
        timeout: Duration,
        settle: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            debug_dir: debug_dir.into(),
            headless,
            timeout,
            settle,
        }
    }

    async fn fetch_inner(&self, url: &str, endpoint: &str) -> Result<RenderedPage, FetchError> {
        let session = BrowserSession::launch(self.headless)
            .await
            .map_err(FetchError::Launch)?;

        let page = session
            .browser()
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                source: e.into(),
            })?;

        page.goto(url).await.map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            source: e.into(),
        })?;
        page.wait_for_navigation()
            .await
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                source: e.into(),
            })?;

        wait_for_body_visible(&page, Duration::from_secs(10)).await;

        // Fixed settle pause: the profile widgets are populated by
        // client-side JS well after the navigation completes.
        tokio::time::sleep(self.settle).await;

        let html = page.content().await.map_err(|e| FetchError::Render {
            url: url.to_string(),
            source: e.into(),
        })?;
        let title = page
            .get_title()
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        let screenshot_params = CaptureScreenshotParams {
            quality: Some(100),
            format: Some(CaptureScreenshotFormat::Png),
            capture_beyond_viewport: Some(true),
            ..Default::default()
        };
        let screenshot = page
            .screenshot(screenshot_params)
            .await
            .map_err(|e| FetchError::Render {
                url: url.to_string(),
                source: e.into(),
            })?;

        match debug_capture::save_debug_artifacts(&self.debug_dir, endpoint, &html, &screenshot)
            .await
        {
            Ok((html_path, _png_path)) => {
                debug!("debug artifacts saved under {}", html_path.display());
            }
            Err(e) => warn!("failed to save debug artifacts for {url}: {e:#}"),
        }

        session.shutdown().await;

        Ok(RenderedPage {
            url: url.to_string(),
            endpoint: endpoint.to_string(),
            title,
            html,
        })
    }
}

#[async_trait]
impl Fetcher for ChromiumFetcher {
    async fn fetch(&self, endpoint: &str) -> Result<RenderedPage, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        info!("fetching {url}");

        match tokio::time::timeout(self.timeout, self.fetch_inner(&url, endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url,
                timeout: self.timeout,
            }),
        }
    }
}

/// Poll until `document.body` exists and the document is fully loaded.
///
/// `wait_for_navigation` only covers the HTTP response; JS-heavy pages
/// need this extra readiness check before capture. Gives up (with a
/// warning) after `max_wait` and lets the caller proceed - the outer
/// fetch timeout still bounds the whole operation.
async fn wait_for_body_visible(page: &Page, max_wait: Duration) {
    const READY_STATE_SCRIPT: &str = r#"
        (function() {
            return {
                readyState: document.readyState,
                bodyVisible: document.body !== null && document.body.getClientRects().length > 0
            };
        })()
    "#;

    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        if start.elapsed() >= max_wait {
            warn!(
                "timeout waiting for page body after {:?}, proceeding anyway",
                max_wait
            );
            return;
        }

        match page.evaluate(READY_STATE_SCRIPT).await {
            Ok(result) => {
                if let Ok(value) = result.into_value::<serde_json::Value>() {
                    let ready = value.get("readyState").and_then(|v| v.as_str())
                        == Some("complete");
                    let body_visible = value
                        .get("bodyVisible")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    if ready && body_visible {
                        debug!(
                            "page body visible after {:.2}s",
                            start.elapsed().as_secs_f64()
                        );
                        return;
                    }
                }
            }
            Err(e) => debug!("readyState check failed: {e}, retrying"),
        }

        tokio::time::sleep(poll_interval).await;
    }
}
