//! HTTP client for the exchange rate API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

const EXCHANGE_RATE_API_BASE: &str = "https://v6.exchangerate-api.com/v6";

/// Trait for exchange rate lookups - enables mocking for tests.
///
/// Lookups never fail loudly: any problem is logged and reported as `None`.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns every known rate from `base`, keyed by currency code.
    async fn latest(&self, base: &str) -> Option<HashMap<String, f64>>;

    /// Returns the rate from `base` to `target`.
    async fn rate(&self, base: &str, target: &str) -> Option<f64> {
        let rates = self.latest(base).await?;
        let target = target.trim().to_uppercase();
        let rate = rates.get(&target).copied();
        if rate.is_none() {
            warn!("Failed to retrieve exchange rate for {}", target);
        }
        rate
    }
}

/// Response body of the `latest` endpoint.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    conversion_rates: Option<HashMap<String, f64>>,
}

/// exchangerate-api.com client.
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateClient {
    /// Creates a new client against the public API.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(EXCHANGE_RATE_API_BASE.to_string(), api_key)
    }

    /// Creates a new client with a custom base URL (for testing).
    pub fn with_base_url(base_url: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url, api_key })
    }

    /// Fetches and decodes the rate table for `base`.
    async fn fetch_rates(&self, api_key: &str, base: &str) -> Result<HashMap<String, f64>> {
        let url = format!(
            "{}/{}/latest/{}",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(base)
        );
        debug!("GET {}/***/latest/{}", self.base_url, base);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", concat!("price-tracker/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Exchange rate API returned status: {}", response.status());
        }

        let body = response.text().await.context("Failed to read response body")?;
        let parsed: LatestResponse =
            serde_json::from_str(&body).context("Failed to parse exchange rate response")?;

        if parsed.result.as_deref() == Some("error") {
            anyhow::bail!(
                "Exchange rate API reported an error: {}",
                parsed.error_type.as_deref().unwrap_or("unknown")
            );
        }

        parsed.conversion_rates.context("Response has no conversion_rates")
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn latest(&self, base: &str) -> Option<HashMap<String, f64>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("EXCHANGE_RATE_API_KEY is not set, skipping currency conversion");
            return None;
        };

        let base = base.trim().to_uppercase();
        info!("Fetching exchange rates for {}", base);

        match self.fetch_rates(api_key, &base).await {
            Ok(rates) => Some(rates),
            Err(e) => {
                warn!("Failed to retrieve exchange rate: {:#}", e);
                None
            }
        }
    }
}
