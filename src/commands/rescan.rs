//! Rescan command: re-scrape every stored product and update changed prices.

use crate::commands::Services;
use crate::config::Config;
use crate::exchange::Converter;
use crate::sites::Scraper;
use anyhow::Result;
use std::fmt;
use tracing::{debug, info, warn};

/// Result of a rescan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescanOutcome {
    /// This many records got a new price; the store was rewritten.
    Changed(usize),
    /// Nothing changed; the store was left untouched.
    NoChanges,
}

impl fmt::Display for RescanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RescanOutcome::Changed(1) => write!(f, "Updated 1 product"),
            RescanOutcome::Changed(n) => write!(f, "Updated {} products", n),
            RescanOutcome::NoChanges => write!(f, "No changes in prices"),
        }
    }
}

/// Refreshes stored products from their shop pages.
pub struct RescanCommand {
    config: Config,
}

impl RescanCommand {
    /// Creates a new rescan command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Rescans the configured store.
    pub async fn execute(&self) -> Result<RescanOutcome> {
        let services = Services::from_config(&self.config)?;
        self.execute_with(&services).await
    }

    /// Rescans with provided services (for testing).
    ///
    /// Records whose base price differs to the cent are replaced in place under
    /// the same id. Records that fail to scrape are kept as they are. When no
    /// fresh conversion is available the stored one is carried over.
    pub async fn execute_with(&self, services: &Services) -> Result<RescanOutcome> {
        let mut catalog = services.store.load();
        if catalog.values().all(|items| items.is_empty()) {
            info!("No data to rescan");
            return Ok(RescanOutcome::NoChanges);
        }

        let scraper =
            Scraper::new(services.fetcher.as_ref(), &services.registry, self.config.base_currency());
        let mut converter = Converter::new(services.rates.as_ref());
        let targets = self.config.target_currencies();

        let mut changed = 0;
        for (category, items) in catalog.iter_mut() {
            for (id, stored) in items.iter_mut() {
                let mut fresh = match scraper.scrape(&stored.url).await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Rescan of {} #{} failed: {}", category, id, e);
                        continue;
                    }
                };

                if fresh.price.same_price(&stored.price) {
                    debug!("{} #{} unchanged at {}", category, id, stored.price);
                    continue;
                }

                info!("{} #{} changed: {} -> {}", category, id, stored.price, fresh.price);
                if !targets.is_empty() {
                    converter.annotate(&mut fresh, targets).await;
                }
                if fresh.exchange_price.is_empty() {
                    fresh.exchange_price = std::mem::take(&mut stored.exchange_price);
                }
                *stored = fresh;
                changed += 1;
            }
        }

        if changed == 0 {
            info!("No changes in prices");
            return Ok(RescanOutcome::NoChanges);
        }

        services.store.save(&catalog)?;
        info!("Updated {} product(s)", changed);
        Ok(RescanOutcome::Changed(changed))
    }
}
