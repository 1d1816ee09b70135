//! Data models for scraped products and the category-grouped catalog.

use crate::price::Amount;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Products of one category keyed by their id.
pub type Category = BTreeMap<u32, ProductRecord>;

/// The whole store: category name to its products.
pub type Catalog = BTreeMap<String, Category>;

/// A product as scraped from a shop page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product page URL
    pub url: String,
    /// Product name
    pub name: String,
    /// Price in the shop's (base) currency
    #[serde(alias = "original_price", alias = "sek_price")]
    pub price: Amount,
    /// Absolute product image URL
    #[serde(default)]
    pub picture_url: String,
    /// Converted prices keyed by currency code
    #[serde(
        default,
        alias = "gbp_price",
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_exchange_price"
    )]
    pub exchange_price: BTreeMap<String, Amount>,
}

impl ProductRecord {
    /// Creates a record with no converted prices.
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        price: Amount,
        picture_url: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            price,
            picture_url: picture_url.into(),
            exchange_price: BTreeMap::new(),
        }
    }

    /// Returns the converted price for `currency`, if present.
    pub fn exchange_for(&self, currency: &str) -> Option<&Amount> {
        self.exchange_price.get(currency)
    }
}

/// Accepts either a `{CODE: "1.00 CODE"}` map or a single `"1.00 CODE"` string.
/// `null` reads as no conversions.
fn deserialize_exchange_price<'de, D>(deserializer: D) -> Result<BTreeMap<String, Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Many(BTreeMap<String, Amount>),
        One(Amount),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => BTreeMap::new(),
        Some(Raw::Many(map)) => map,
        Some(Raw::One(amount)) => match amount.currency.clone() {
            Some(code) => BTreeMap::from([(code, amount)]),
            None => BTreeMap::new(),
        },
    })
}
