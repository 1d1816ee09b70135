//! Scrape pipeline: site dispatch, fetch, and extraction.

use crate::price::Amount;
use crate::sites::client::PageFetcher;
use crate::sites::error::ExtractError;
use crate::sites::models::ProductRecord;
use crate::sites::registry::SiteRegistry;
use scraper::Html;
use tracing::{info, warn};

/// Scrapes product pages through a fetcher and a site registry.
pub struct Scraper<'a> {
    fetcher: &'a dyn PageFetcher,
    registry: &'a SiteRegistry,
    base_currency: String,
}

impl<'a> Scraper<'a> {
    /// Creates a scraper that tags prices with `base_currency`.
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        registry: &'a SiteRegistry,
        base_currency: impl Into<String>,
    ) -> Self {
        Self { fetcher, registry, base_currency: base_currency.into() }
    }

    /// Scrapes one product URL.
    ///
    /// The shop is resolved before anything is fetched, so unsupported URLs
    /// never cause a request.
    pub async fn scrape(&self, url: &str) -> Result<ProductRecord, ExtractError> {
        let url = url.trim();

        let Some(site) = self.registry.resolve(url) else {
            warn!("Unsupported website: {}", url);
            return Err(ExtractError::UnsupportedSite(url.to_string()));
        };

        info!("Scraping {} product: {}", site.name(), url);

        let html = self.fetcher.fetch(url).await.map_err(ExtractError::Fetch)?;
        let document = Html::parse_document(&html);

        let mut record = site.extract(&document, url)?;
        record.price = Amount::new(record.price.value, self.base_currency.as_str());

        Ok(record)
    }
}
