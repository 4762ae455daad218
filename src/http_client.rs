//! HTTP client for product pages and images
//!
//! Features:
//! - Browser-like default headers (see [`crate::fingerprint`])
//! - Brotli, Gzip, Deflate compression (auto-negotiated)
//! - Connection pooling with keep-alive and a cookie store
//! - Fixed-backoff retry for page fetches
//! - Streaming downloads straight to disk

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::fingerprint::{random_profile, BrowserProfile};
use crate::reel::{ReelError, SourceFetcher};

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Run `op` until it succeeds or attempts run out; the last error propagates.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!("Attempt {attempt}/{attempts} failed: {e:#}; retrying");
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// HTTP client with browser fingerprinting
#[derive(Clone)]
pub struct AcceleratedClient {
    client: Client,
}

impl AcceleratedClient {
    /// Create a new client with a random browser profile
    pub fn new() -> Result<Self> {
        Self::with_profile(random_profile())
    }

    /// Create client with specific browser profile
    pub fn with_profile(profile: BrowserProfile) -> Result<Self> {
        let headers = profile.to_headers();

        let client = Client::builder()
            // Let the server negotiate HTTP/2
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// GET a URL; non-success statuses are errors
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<Response> {
        debug!("Fetching");
        let response = self.client.get(url).send().await?;

        info!(
            status = %response.status(),
            version = ?response.version(),
            content_encoding = ?response.headers().get("content-encoding"),
            "Response received"
        );

        Ok(response.error_for_status()?)
    }

    /// Fetch and return body as string
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.fetch(url).await?;
        let text = response.text().await?;
        Ok(text)
    }

    /// Fetch body text, retrying per `policy`
    pub async fn fetch_text_with_retry(&self, url: &str, policy: RetryPolicy) -> Result<String> {
        with_retry(policy, |attempt| async move {
            debug!(attempt, "Fetching page");
            self.fetch_text(url).await
        })
        .await
    }

    /// Stream a URL to `dest` in one attempt. A partial file is removed on error.
    #[instrument(skip(self, dest), fields(url = %url))]
    pub async fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let result = self.stream_to_file(url, dest).await;
        if result.is_err() && tokio::fs::try_exists(dest).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(dest).await;
        }
        result
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.fetch(url).await?;
        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("failed to create {}", dest.display()))?;

        let mut stream = response.bytes_stream();
        let mut total = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("download interrupted")?;
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Downloaded {} bytes to {:?}", total, dest);
        Ok(total)
    }

    /// Get the underlying reqwest client
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl SourceFetcher for AcceleratedClient {
    async fn fetch_to(&self, url: &str, dest: &Path) -> crate::reel::Result<()> {
        self.download_to(url, dest)
            .await
            .map(|_| ())
            .map_err(|e| ReelError::Fetch {
                url: url.to_string(),
                reason: format!("{e:#}"),
            })
    }
}
