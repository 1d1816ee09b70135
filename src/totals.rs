//! Per-category and overall price totals.

use crate::sites::models::{Catalog, Category};
use std::collections::BTreeMap;

/// Sums of one group of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    /// Sum of base prices
    pub original_total: f64,
    /// Sum of converted prices per currency code
    pub exchange_totals: BTreeMap<String, f64>,
}

impl CategoryTotals {
    /// Sums the records of one category.
    pub fn from_category(items: &Category) -> Self {
        let mut totals = Self::default();
        for record in items.values() {
            totals.original_total += record.price.value;
            for (code, amount) in &record.exchange_price {
                *totals.exchange_totals.entry(code.clone()).or_insert(0.0) += amount.value;
            }
        }
        totals
    }

    /// Adds another group's sums into this one.
    pub fn accumulate(&mut self, other: &CategoryTotals) {
        self.original_total += other.original_total;
        for (code, value) in &other.exchange_totals {
            *self.exchange_totals.entry(code.clone()).or_insert(0.0) += value;
        }
    }

    /// Returns the converted total for `currency`, zero when nothing was converted.
    pub fn exchange_total(&self, currency: &str) -> f64 {
        self.exchange_totals.get(currency).copied().unwrap_or(0.0)
    }
}

/// Totals for every category plus the overall sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub categories: BTreeMap<String, CategoryTotals>,
    pub overall: CategoryTotals,
}

impl Totals {
    /// Computes totals over the whole catalog.
    ///
    /// The overall sum is built from the category sums, so it always equals
    /// their sum exactly.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut totals = Self::default();
        for (name, items) in catalog {
            let category = CategoryTotals::from_category(items);
            totals.overall.accumulate(&category);
            totals.categories.insert(name.clone(), category);
        }
        totals
    }

    /// Returns the totals of one category.
    pub fn category(&self, name: &str) -> Option<&CategoryTotals> {
        self.categories.get(name)
    }
}
