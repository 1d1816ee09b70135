//! Add command: scrape product URLs and store them under a category.

use crate::commands::Services;
use crate::config::Config;
use crate::exchange::Converter;
use crate::sites::{ProductRecord, Scraper};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Scrapes products and files them under a category.
pub struct AddCommand {
    config: Config,
}

impl AddCommand {
    /// Creates a new add command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Adds each URL under `category` and returns a summary.
    pub async fn execute(&self, category: &str, urls: &[String]) -> Result<String> {
        let services = Services::from_config(&self.config)?;
        self.execute_with(&services, category, urls).await
    }

    /// Adds URLs with provided services (for testing).
    ///
    /// Failed URLs are reported in the summary and do not stop the others.
    pub async fn execute_with(
        &self,
        services: &Services,
        category: &str,
        urls: &[String],
    ) -> Result<String> {
        let category = self.resolve_category(category)?;

        let scraper =
            Scraper::new(services.fetcher.as_ref(), &services.registry, self.config.base_currency());
        let mut converter = Converter::new(services.rates.as_ref());

        let mut lines = Vec::new();
        for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            match self.add_one(services, &scraper, &mut converter, category, url).await {
                Ok((id, record)) => {
                    let mut line =
                        format!("Added #{} to {}: {} ({})", id, category, record.name, record.price);
                    for amount in record.exchange_price.values() {
                        line.push_str(&format!(" / {}", amount));
                    }
                    lines.push(line);
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", url, e);
                    lines.push(format!("Skipped {}: {:#}", url, e));
                }
            }
        }

        if lines.is_empty() {
            return Ok("No URLs given.".to_string());
        }

        Ok(lines.join("\n"))
    }

    /// Returns the configured spelling of `category` or a helpful error.
    fn resolve_category(&self, category: &str) -> Result<&str> {
        self.config.find_category(category).with_context(|| {
            format!(
                "Unknown category '{}'. Available: {}",
                category.trim(),
                self.config.categories.join(", ")
            )
        })
    }

    async fn add_one(
        &self,
        services: &Services,
        scraper: &Scraper<'_>,
        converter: &mut Converter<'_>,
        category: &str,
        url: &str,
    ) -> Result<(u32, ProductRecord)> {
        let mut record = scraper.scrape(url).await?;

        let targets = self.config.target_currencies();
        if !targets.is_empty() {
            converter.annotate(&mut record, targets).await;
        }

        let id = services.store.insert(category, record.clone())?;
        info!("Added {} as #{} in {}", record.name, id, category);

        Ok((id, record))
    }
}
