//! CSS selectors and structural paths for the supported shops.
//!
//! Update this file when a shop changes its product page markup, and add a
//! fixture under `tests/fixtures/` that reproduces the new layout.

use crate::sites::path::StructuralPath;
use scraper::Selector;
use std::sync::LazyLock;

/// IKEA product pages (ikea.com).
pub mod ikea {
    use super::*;

    pub const DOMAIN: &str = "ikea.com";

    pub static NAME: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.pip-header-section__description-text").unwrap());

    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.pip-temp-price__integer").unwrap());

    pub static IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("img.pip-image").unwrap());
}

/// Elgiganten product pages (elgiganten.se).
pub mod elgiganten {
    use super::*;

    pub const DOMAIN: &str = "elgiganten.se";

    pub static NAME: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.font-regular.font-bold.text-xl").unwrap());

    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.font-headline.inc-vat").unwrap());

    /// First gallery slide image.
    pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse("li.items-center.flex.snap-start.pb-10 img").unwrap()
    });
}

/// Trademax product pages (trademax.se). The markup has no stable classes,
/// so elements are addressed by position.
pub mod trademax {
    use super::*;

    pub const DOMAIN: &str = "trademax.se";

    pub static NAME: LazyLock<StructuralPath> = LazyLock::new(|| {
        "/html/body/div[1]/div/main/div[2]/div[2]/div[1]/h1".parse().unwrap()
    });

    pub static PRICE: LazyLock<StructuralPath> = LazyLock::new(|| {
        "/html/body/div[1]/div/main/div[2]/div[2]/div[1]/div[2]/div[2]/div/div".parse().unwrap()
    });

    pub static IMAGE: LazyLock<StructuralPath> = LazyLock::new(|| {
        "/html/body/div[1]/div/main/div[2]/div[1]/div/div[2]/div[1]/div/div/div[1]/img"
            .parse()
            .unwrap()
    });
}
