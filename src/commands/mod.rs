//! CLI command implementations.

pub mod add;
pub mod export;
pub mod rescan;

pub use add::AddCommand;
pub use export::ExportCommand;
pub use rescan::{RescanCommand, RescanOutcome};

use crate::config::Config;
use crate::exchange::{ExchangeRateClient, RateSource};
use crate::sites::{HttpFetcher, PageFetcher, SiteRegistry};
use crate::store::{JsonFileStore, ProductStore};
use anyhow::{Context, Result};

/// Everything a command talks to, behind traits so tests can swap them.
pub struct Services {
    pub fetcher: Box<dyn PageFetcher>,
    pub rates: Box<dyn RateSource>,
    pub store: Box<dyn ProductStore>,
    pub registry: SiteRegistry,
}

impl Services {
    /// Creates services with the built-in shops.
    pub fn new(
        fetcher: impl PageFetcher + 'static,
        rates: impl RateSource + 'static,
        store: impl ProductStore + 'static,
    ) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            rates: Box::new(rates),
            store: Box::new(store),
            registry: SiteRegistry::with_defaults(),
        }
    }

    /// Creates the real HTTP, exchange API and JSON file services.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch).context("Failed to create HTTP client")?;
        let rates = ExchangeRateClient::new(config.api_key.clone())
            .context("Failed to create exchange rate client")?;
        let store = JsonFileStore::new(&config.store_path);

        Ok(Self::new(fetcher, rates, store))
    }
}
