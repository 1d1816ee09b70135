//! Per-pass rate memoization and amount conversion.

use crate::exchange::client::RateSource;
use crate::price::Amount;
use crate::sites::models::ProductRecord;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Converts amounts, fetching each base currency's rate table at most once.
///
/// A converter lives for one export or one rescan, so a pass over N records
/// costs one request per base currency. Failed lookups are remembered too.
pub struct Converter<'a> {
    source: &'a dyn RateSource,
    cache: HashMap<String, Option<HashMap<String, f64>>>,
}

impl<'a> Converter<'a> {
    /// Creates a converter with an empty cache.
    pub fn new(source: &'a dyn RateSource) -> Self {
        Self { source, cache: HashMap::new() }
    }

    /// Returns the rate from `base` to `target`. Identical currencies are 1.0.
    pub async fn rate(&mut self, base: &str, target: &str) -> Option<f64> {
        let base = base.trim().to_uppercase();
        let target = target.trim().to_uppercase();
        if base == target {
            return Some(1.0);
        }

        if !self.cache.contains_key(&base) {
            let rates = self.source.latest(&base).await;
            self.cache.insert(base.clone(), rates);
        } else {
            debug!("Using cached rates for {}", base);
        }

        self.cache
            .get(&base)
            .and_then(Option::as_ref)
            .and_then(|rates| rates.get(&target))
            .copied()
    }

    /// Converts `amount` into each of `targets`, skipping unavailable rates.
    pub async fn convert(&mut self, amount: &Amount, targets: &[String]) -> BTreeMap<String, Amount> {
        let mut converted = BTreeMap::new();

        let Some(base) = amount.currency.clone() else {
            warn!("Cannot convert {} without a currency", amount);
            return converted;
        };

        for target in targets {
            let code = target.trim().to_uppercase();
            match self.rate(&base, &code).await {
                Some(rate) => {
                    converted.insert(code.clone(), amount.convert(rate, code));
                }
                None => warn!("No exchange rate from {} to {}, skipping", base, code),
            }
        }

        converted
    }

    /// Replaces the record's converted prices with fresh conversions.
    pub async fn annotate(&mut self, record: &mut ProductRecord, targets: &[String]) {
        record.exchange_price = self.convert(&record.price, targets).await;
    }
}
