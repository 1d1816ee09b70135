//! HTTP fetching of product pages using wreq browser emulation.

use crate::config::FetchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for fetching page HTML - enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at `url` and returns its body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Product page client with fixed-delay retries.
pub struct HttpFetcher {
    client: Client,
    retries: u32,
    retry_delay_ms: u64,
}

impl HttpFetcher {
    /// Creates a fetcher from the fetch settings.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, retries: config.retries.max(1), retry_delay_ms: config.retry_delay_ms })
    }

    /// Performs a single GET with browser headers.
    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", "sv-SE,sv;q=0.9,en;q=0.8")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching product page: {}", url);

        for attempt in 1..=self.retries {
            match self.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Failed to retrieve the webpage (attempt {}): {:#}", attempt, e);
                    if attempt < self.retries && self.retry_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
                    }
                }
            }
        }

        warn!("Exceeded maximum retry attempts for {}", url);
        anyhow::bail!("Exceeded maximum retry attempts ({}) for {}", self.retries, url)
    }
}
