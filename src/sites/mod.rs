//! Shop-specific modules for fetching, locating and extracting products.

pub mod client;
pub mod error;
pub mod extractor;
pub mod models;
pub mod path;
pub mod pipeline;
pub mod registry;
pub mod selectors;

pub use client::{HttpFetcher, PageFetcher};
pub use error::ExtractError;
pub use extractor::{SiteExtractor, SiteProfile};
pub use models::{Catalog, Category, ProductRecord};
pub use pipeline::Scraper;
pub use registry::SiteRegistry;
