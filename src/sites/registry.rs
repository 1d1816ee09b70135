//! Lookup from product URL to the shop that can extract it.

use crate::sites::extractor::{SiteExtractor, SiteProfile};

/// Ordered collection of supported shops.
pub struct SiteRegistry {
    sites: Vec<Box<dyn SiteExtractor>>,
}

impl SiteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { sites: Vec::new() }
    }

    /// Creates a registry with every built-in shop.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(SiteProfile::ikea())
            .register(SiteProfile::elgiganten())
            .register(SiteProfile::trademax());
        registry
    }

    /// Adds a shop. Earlier registrations win when domains overlap.
    pub fn register(&mut self, site: impl SiteExtractor + 'static) -> &mut Self {
        self.sites.push(Box::new(site));
        self
    }

    /// Returns the shop whose domain appears in `url`.
    pub fn resolve(&self, url: &str) -> Option<&dyn SiteExtractor> {
        self.sites.iter().find(|s| s.matches(url)).map(|s| &**s)
    }

    /// Returns the domains of all registered shops.
    pub fn domains(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.domain()).collect()
    }

    /// Returns the number of registered shops.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns true if no shops are registered.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
