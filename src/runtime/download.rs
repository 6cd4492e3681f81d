//! HTTP downloads for the Node.js runtime.
//!
//! Downloads stream into `<dest>.part` and are renamed into place only once
//! complete, so a cached file is never a truncated one.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Download configuration options.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Request timeout (None for large files)
    pub timeout: Option<Duration>,
    /// Retries after the first attempt for transient failures
    pub retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub retry_delay: Duration,
    pub show_progress: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: 3,
            retry_delay: Duration::from_secs(2),
            show_progress: true,
        }
    }
}

impl DownloadOptions {
    /// Small text fetch: short timeout, one attempt, no progress.
    pub fn metadata() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            retries: 0,
            retry_delay: Duration::from_secs(1),
            show_progress: false,
        }
    }
}

/// Download progress.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl Progress {
    pub fn percent(&self) -> Option<u8> {
        self.total
            .filter(|t| *t > 0)
            .map(|t| ((self.downloaded.min(t) * 100) / t) as u8)
    }

    /// Format as human-readable string
    pub fn display(&self) -> String {
        let mb = |bytes: u64| bytes as f64 / (1024.0 * 1024.0);
        match (self.total, self.percent()) {
            (Some(total), Some(pct)) => {
                format!("{:.1}/{:.1} MB ({}%)", mb(self.downloaded), mb(total), pct)
            }
            _ => format!("{:.1} MB", mb(self.downloaded)),
        }
    }
}

/// Drive an async download to completion from synchronous code.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("ccr-packager/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Download `url` to `dest`, retrying transient failures.
pub async fn http(url: &str, dest: &Path, options: &DownloadOptions) -> Result<()> {
    let client = client()?;
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = options.retry_delay * (1 << (attempt - 1).min(4));
            if options.show_progress {
                println!("    Retry {}/{} in {:?}...", attempt, options.retries, delay);
            }
            tokio::time::sleep(delay).await;
        }
        attempt += 1;

        match http_attempt(&client, url, dest, options).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                if !is_retryable_error(&e) || attempt > options.retries {
                    return Err(e);
                }
                warn!("Download attempt {} failed: {:#}", attempt, e);
            }
        }
    }
}

async fn http_attempt(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    options: &DownloadOptions,
) -> Result<()> {
    let mut request = client.get(url);
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("HTTP request failed: {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!(
            "HTTP {} for {}: {}",
            status.as_u16(),
            url,
            status.canonical_reason().unwrap_or("Unknown error")
        );
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let part = part_path(dest);
    if let Err(e) = stream_to_file(response, url, &part, options).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e);
    }

    tokio::fs::rename(&part, dest)
        .await
        .with_context(|| format!("Failed to move {} into place", part.display()))?;
    debug!(url, dest = %dest.display(), "Download complete");
    Ok(())
}

/// Write the response body to `part`, checking it against Content-Length.
async fn stream_to_file(
    mut response: reqwest::Response,
    url: &str,
    part: &Path,
    options: &DownloadOptions,
) -> Result<()> {
    let file = tokio::fs::File::create(part)
        .await
        .with_context(|| format!("Failed to create {}", part.display()))?;
    let mut writer = tokio::io::BufWriter::new(file);

    let mut progress = Progress {
        downloaded: 0,
        total: response.content_length(),
    };
    let mut last_percent = None;

    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed to read chunk from {}", url))?
    {
        writer
            .write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write to {}", part.display()))?;
        progress.downloaded += chunk.len() as u64;

        if options.show_progress && progress.percent() != last_percent {
            last_percent = progress.percent();
            print!("\r    {}", progress.display());
            std::io::stdout().flush().ok();
        }
    }

    writer
        .flush()
        .await
        .with_context(|| format!("Failed to flush {}", part.display()))?;

    if options.show_progress {
        println!();
    }

    if let Some(expected) = progress.total {
        if progress.downloaded != expected {
            bail!(
                "Download incomplete for {}: expected {} bytes, got {} bytes",
                url,
                expected,
                progress.downloaded
            );
        }
    }
    debug!(bytes = progress.downloaded, "Body written to {}", part.display());
    Ok(())
}

/// Fetch a small text resource.
pub async fn fetch_text(url: &str, options: &DownloadOptions) -> Result<String> {
    let client = client()?;
    let mut request = client.get(url);
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("HTTP request failed: {}", url))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP {} for {}", status.as_u16(), url));
    }
    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Check if an error is likely transient and worth retrying.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    let msg = format!("{:#}", e).to_lowercase();
    msg.contains("timeout")
        || msg.contains("timed out")
        || msg.contains("connection reset")
        || msg.contains("connection refused")
        || msg.contains("temporarily unavailable")
        || msg.contains("incomplete")
        || msg.contains("http 502")
        || msg.contains("http 503")
        || msg.contains("http 504")
}
