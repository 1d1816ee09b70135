//! Per-site product extraction.

use crate::price::{parse_price, Amount};
use crate::sites::error::ExtractError;
use crate::sites::models::ProductRecord;
use crate::sites::path::StructuralPath;
use crate::sites::selectors::{elgiganten, ikea, trademax};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

/// A shop that knows where name, price and image live on its product pages.
pub trait SiteExtractor: Send + Sync {
    /// Display name used in log messages.
    fn name(&self) -> &str;

    /// Domain fragment that identifies this shop's URLs.
    fn domain(&self) -> &str;

    /// Returns the product name text, if present.
    fn locate_name(&self, document: &Html) -> Option<String>;

    /// Returns the raw price text, if present.
    fn locate_price(&self, document: &Html) -> Option<String>;

    /// Returns the image `src` as written on the page, if present.
    fn locate_image(&self, document: &Html) -> Option<String>;

    /// Returns true if `url` belongs to this shop.
    fn matches(&self, url: &str) -> bool {
        url.contains(self.domain())
    }

    /// Builds a full record from a product page, or fails on the first
    /// missing piece. The price carries no currency; the caller attaches it.
    fn extract(&self, document: &Html, page_url: &str) -> Result<ProductRecord, ExtractError> {
        let site = self.name().to_string();

        let Some(name) = self.locate_name(document) else {
            warn!("Failed to retrieve product name from {}", site);
            return Err(ExtractError::MissingName { site });
        };

        let Some(price_text) = self.locate_price(document) else {
            warn!("Failed to retrieve product price from {}", site);
            return Err(ExtractError::MissingPrice { site });
        };

        let Some(src) = self.locate_image(document) else {
            warn!("Failed to retrieve product picture from {}", site);
            return Err(ExtractError::MissingImage { site });
        };

        let Some(value) = parse_price(&price_text) else {
            warn!("Failed to parse the price for {} product", site);
            return Err(ExtractError::Price { site, text: price_text });
        };

        let picture_url = resolve_image_url(page_url, &src)?;

        debug!("Extracted '{}' at {} from {}", name, value, site);

        Ok(ProductRecord::new(page_url, name, Amount::bare(value), picture_url))
    }
}

/// Resolves a possibly site-relative image URL against the product page URL.
pub fn resolve_image_url(page_url: &str, src: &str) -> Result<String, ExtractError> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Ok(src.to_string());
    }

    let invalid = |reason: String| ExtractError::InvalidUrl { url: page_url.to_string(), reason };
    let base = Url::parse(page_url).map_err(|e| invalid(e.to_string()))?;
    let joined = base.join(src).map_err(|e| invalid(e.to_string()))?;
    Ok(joined.to_string())
}

/// How one field is found on a page.
#[derive(Clone, Copy)]
pub enum Locator {
    Css(&'static LazyLock<Selector>),
    Path(&'static LazyLock<StructuralPath>),
}

impl Locator {
    fn first<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            Locator::Css(selector) => document.select(selector).next(),
            Locator::Path(path) => path.select_first(document),
        }
    }

    fn text(&self, document: &Html) -> Option<String> {
        self.first(document)
            .map(|e| e.text().collect::<Vec<_>>().join(" "))
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())
    }

    fn image_src(&self, document: &Html) -> Option<String> {
        let element = self.first(document)?;
        element
            .value()
            .attr("src")
            .or_else(|| element.value().attr("data-src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(String::from)
    }
}

/// A shop described entirely by three locators.
pub struct SiteProfile {
    pub name: &'static str,
    pub domain: &'static str,
    pub name_locator: Locator,
    pub price_locator: Locator,
    pub image_locator: Locator,
}

impl SiteProfile {
    /// IKEA, located by CSS classes.
    pub fn ikea() -> Self {
        Self {
            name: "IKEA",
            domain: ikea::DOMAIN,
            name_locator: Locator::Css(&ikea::NAME),
            price_locator: Locator::Css(&ikea::PRICE),
            image_locator: Locator::Css(&ikea::IMAGE),
        }
    }

    /// Elgiganten, located by CSS classes.
    pub fn elgiganten() -> Self {
        Self {
            name: "Elgiganten",
            domain: elgiganten::DOMAIN,
            name_locator: Locator::Css(&elgiganten::NAME),
            price_locator: Locator::Css(&elgiganten::PRICE),
            image_locator: Locator::Css(&elgiganten::IMAGE),
        }
    }

    /// Trademax, located by structural position.
    pub fn trademax() -> Self {
        Self {
            name: "Trademax",
            domain: trademax::DOMAIN,
            name_locator: Locator::Path(&trademax::NAME),
            price_locator: Locator::Path(&trademax::PRICE),
            image_locator: Locator::Path(&trademax::IMAGE),
        }
    }
}

impl SiteExtractor for SiteProfile {
    fn name(&self) -> &str {
        self.name
    }

    fn domain(&self) -> &str {
        self.domain
    }

    fn locate_name(&self, document: &Html) -> Option<String> {
        self.name_locator.text(document)
    }

    fn locate_price(&self, document: &Html) -> Option<String> {
        self.price_locator.text(document)
    }

    fn locate_image(&self, document: &Html) -> Option<String> {
        self.image_locator.image_src(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IKEA_URL: &str = "https://www.ikea.com/se/sv/p/kallax-hylla-vit-80275887/";

    fn ikea_page(image: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body>
                <h1><span class="pip-header-section__title--big">KALLAX</span>
                <span class="pip-header-section__description-text">Hylla, vit, 77x77 cm</span></h1>
                <span class="pip-temp-price__integer">1&nbsp;299</span>
                {image}
            </body></html>"#
        ))
    }

    #[test]
    fn test_ikea_extract() {
        let document = ikea_page(r#"<img class="pip-image" src="https://www.ikea.com/se/sv/images/kallax.jpg">"#);
        let record = SiteProfile::ikea().extract(&document, IKEA_URL).unwrap();

        assert_eq!(record.name, "Hylla, vit, 77x77 cm");
        assert_eq!(record.price.value, 1299.0);
        assert!(record.price.currency.is_none());
        assert_eq!(record.picture_url, "https://www.ikea.com/se/sv/images/kallax.jpg");
        assert_eq!(record.url, IKEA_URL);
    }

    #[test]
    fn test_missing_image_is_not_found() {
        let document = ikea_page("");
        let result = SiteProfile::ikea().extract(&document, IKEA_URL);
        assert!(matches!(result, Err(ExtractError::MissingImage { .. })));
    }

    #[test]
    fn test_image_without_src_is_not_found() {
        let document = ikea_page(r#"<img class="pip-image" alt="KALLAX">"#);
        let result = SiteProfile::ikea().extract(&document, IKEA_URL);
        assert!(matches!(result, Err(ExtractError::MissingImage { .. })));

        let document = ikea_page(r#"<img class="pip-image" src="  ">"#);
        let result = SiteProfile::ikea().extract(&document, IKEA_URL);
        assert!(matches!(result, Err(ExtractError::MissingImage { .. })));
    }

    #[test]
    fn test_lazy_image_uses_data_src() {
        let document = ikea_page(r#"<img class="pip-image" data-src="/images/lazy.jpg">"#);
        let record = SiteProfile::ikea().extract(&document, IKEA_URL).unwrap();
        assert_eq!(record.picture_url, "https://www.ikea.com/images/lazy.jpg");
    }

    #[test]
    fn test_missing_name_and_price() {
        let document = Html::parse_document(
            r#"<html><body><span class="pip-temp-price__integer">99</span></body></html>"#,
        );
        let result = SiteProfile::ikea().extract(&document, IKEA_URL);
        assert!(matches!(result, Err(ExtractError::MissingName { .. })));

        let document = Html::parse_document(
            r#"<html><body><span class="pip-header-section__description-text">Lampa</span></body></html>"#,
        );
        let result = SiteProfile::ikea().extract(&document, IKEA_URL);
        assert!(matches!(result, Err(ExtractError::MissingPrice { .. })));
    }

    #[test]
    fn test_unparsable_price_aborts() {
        let document = Html::parse_document(
            r#"<html><body>
                <span class="pip-header-section__description-text">Lampa</span>
                <span class="pip-temp-price__integer">Slutsåld</span>
                <img class="pip-image" src="https://www.ikea.com/lampa.jpg">
            </body></html>"#,
        );
        let result = SiteProfile::ikea().extract(&document, IKEA_URL);
        match result {
            Err(ExtractError::Price { text, .. }) => assert_eq!(text, "Slutsåld"),
            other => panic!("expected price error, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_image_url() {
        let page = "https://www.trademax.se/soffor/soffa-p123";
        assert_eq!(
            resolve_image_url(page, "/media/img/soffa.jpg").unwrap(),
            "https://www.trademax.se/media/img/soffa.jpg"
        );
        assert_eq!(
            resolve_image_url(page, "//cdn.trademax.se/soffa.jpg").unwrap(),
            "https://cdn.trademax.se/soffa.jpg"
        );
        assert_eq!(
            resolve_image_url(page, "https://cdn.example.com/a.jpg").unwrap(),
            "https://cdn.example.com/a.jpg"
        );
        assert!(matches!(
            resolve_image_url("not a url", "/a.jpg"),
            Err(ExtractError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_matches_domain_substring() {
        let site = SiteProfile::elgiganten();
        assert!(site.matches("https://www.elgiganten.se/product/kaffe/123"));
        assert!(!site.matches("https://www.ikea.com/se/sv/p/1"));
    }
}
