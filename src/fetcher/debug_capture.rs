//! Debug artifact capture.
//!
//! Raw HTML and screenshots are written per fetch, keyed by endpoint and
//! UTC timestamp. The artifacts are diagnostic only: nothing in the crawl
//! path ever reads them back, and a failed write never fails the fetch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

/// Write `<debug_dir>/<endpoint-key>_<stamp>.html` and `.png`.
/// Returns the two paths for logging.
pub(crate) async fn save_debug_artifacts(
    debug_dir: &Path,
    endpoint: &str,
    html: &str,
    screenshot: &[u8],
) -> Result<(PathBuf, PathBuf)> {
    tokio::fs::create_dir_all(debug_dir)
        .await
        .context("Failed to create debug directory")?;

    let key = sanitize_filename::sanitize(endpoint.trim_start_matches('/').replace('/', "_"));
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let base = debug_dir.join(format!("{key}_{stamp}"));

    let html_path = base.with_extension("html");
    let png_path = base.with_extension("png");

    tokio::fs::write(&html_path, html)
        .await
        .with_context(|| format!("Failed to write {}", html_path.display()))?;
    tokio::fs::write(&png_path, screenshot)
        .await
        .with_context(|| format!("Failed to write {}", png_path.display()))?;

    log::debug!(
        "captured {} bytes of html and {} bytes of screenshot for {endpoint}",
        html.len(),
        screenshot.len()
    );

    Ok((html_path, png_path))
}
