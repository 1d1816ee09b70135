//! price-tracker - Scrape product prices into category lists and report on them
//!
//! Products are scraped from supported shops, stored as category-grouped JSON
//! records, rescanned for price changes, converted into other currencies and
//! rendered into a static HTML report.

pub mod commands;
pub mod config;
pub mod exchange;
pub mod menu;
pub mod price;
pub mod report;
pub mod sites;
pub mod store;
pub mod totals;

pub use config::Config;
pub use price::{parse_price, Amount};
pub use sites::models::{Catalog, Category, ProductRecord};
pub use totals::Totals;
