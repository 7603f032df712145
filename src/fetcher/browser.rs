//! Browser session lifecycle for page fetching.
//!
//! Each fetch runs in its own Chromium session with a unique user-data
//! directory, so successive fetches share no cookies, storage, or page
//! state. The handler task MUST be aborted when the session ends or it
//! keeps running after the browser process is gone.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{info, trace, warn};

use crate::utils::constants::CHROME_USER_AGENT;

/// Monotonic session counter, used to keep user-data dirs unique within
/// one process (the scheduler launches many sessions per sweep).
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// A launched browser plus its CDP handler task and profile directory.
///
/// Dropping the session aborts the handler and removes the profile dir;
/// [`BrowserSession::shutdown`] does the same after closing the browser
/// gracefully.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserSession {
    /// Launch an isolated headless session.
    pub async fn launch(headless: bool) -> Result<Self> {
        let chrome_path = match find_browser_executable().await {
            Ok(path) => path,
            Err(_) => download_managed_browser().await?,
        };

        let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
        let user_data_dir = std::env::temp_dir().join(format!(
            "agentwatch_chrome_{}_{seq}",
            std::process::id()
        ));
        std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

        let mut config_builder = BrowserConfigBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .window_size(1920, 1080)
            .user_data_dir(user_data_dir.clone())
            .chrome_executable(chrome_path);

        if headless {
            config_builder = config_builder.headless_mode(HeadlessMode::default());
        } else {
            config_builder = config_builder.with_head();
        }

        config_builder = config_builder
            .arg(format!("--user-agent={CHROME_USER_AGENT}"))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-notifications")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-background-networking")
            .arg("--disable-background-timer-throttling")
            .arg("--disable-breakpad")
            .arg("--disable-hang-monitor")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--ignore-certificate-errors")
            .arg("--metrics-recording-only")
            .arg("--password-store=basic")
            .arg("--use-mock-keychain")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");

        let browser_config = config_builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handler_task = task::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    let msg = e.to_string();
                    // Chrome sends CDP events chromiumoxide doesn't recognize;
                    // those deserialization misses are noise, not failures.
                    // https://github.com/mattsse/chromiumoxide/issues/167
                    let benign = msg
                        .contains("data did not match any variant of untagged enum Message")
                        || msg.contains("Failed to deserialize WS response");
                    if benign {
                        trace!("suppressed benign CDP serialization error: {msg}");
                    } else {
                        warn!("browser handler error: {msg}");
                    }
                }
            }
            trace!("browser handler task completed");
        });

        Ok(Self {
            browser,
            handler: handler_task,
            user_data_dir: Some(user_data_dir),
        })
    }

    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser gracefully, stop the handler, remove the
    /// profile directory.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser wait failed: {e}");
        }
        self.handler.abort();
        self.cleanup_user_data_dir();
    }

    /// Blocking removal so it is callable from Drop. The dir only exists
    /// after Chrome has released its file handles, hence best-effort.
    fn cleanup_user_data_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "failed to remove user data dir {}: {e}. Manual cleanup may be required.",
                    path.display()
                );
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop kills the Chrome process
        self.cleanup_user_data_dir();
    }
}

/// Find a Chrome/Chromium executable with platform-specific search paths.
///
/// The `CHROMIUM_PATH` environment variable overrides all other methods.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("Found browser via 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found. Will download and use fetcher.");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download and manage a Chromium build when none is installed locally.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir().join("agentwatch_chrome_cache");
            warn!(
                "Could not determine cache directory, using temp fallback: {}",
                fallback.display()
            );
            fallback
        })
        .join("agentwatch")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}
