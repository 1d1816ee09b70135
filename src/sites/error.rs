//! Per-product extraction failures.

use thiserror::Error;

/// Why a product could not be scraped.
///
/// Every variant is terminal for that product only; callers log it and move
/// on to the next URL or record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported website: {0}")]
    UnsupportedSite(String),

    #[error("Invalid product URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch product page: {0:#}")]
    Fetch(anyhow::Error),

    #[error("Failed to retrieve product name from {site}")]
    MissingName { site: String },

    #[error("Failed to retrieve product price from {site}")]
    MissingPrice { site: String },

    #[error("Failed to retrieve product picture from {site}")]
    MissingImage { site: String },

    #[error("Failed to parse the price '{text}' for {site} product")]
    Price { site: String, text: String },
}
