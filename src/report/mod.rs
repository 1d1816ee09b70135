//! HTML report rendering.
//!
//! Rendering is pure: the caller loads the catalog, computes totals and
//! writes the returned document wherever it wants.

mod group;

pub use group::{group_items, normalize_name, ItemGroup};

use crate::price::Amount;
use crate::sites::models::{Catalog, Category};
use crate::totals::{CategoryTotals, Totals};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

/// Currencies shown in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCurrencies {
    /// Currency of the stored prices
    pub base: String,
    /// Converted currencies, in display order
    pub targets: Vec<String>,
}

impl ReportCurrencies {
    pub fn new(base: impl Into<String>, targets: &[String]) -> Self {
        Self { base: base.into(), targets: targets.to_vec() }
    }
}

const STYLE: &str = r#"        body { font-family: Arial, sans-serif; display: flex; justify-content: center; padding: 20px; background-color: #f5f5f5; }
        .container { max-width: 800px; width: 100%; background: #fff; padding: 20px; border-radius: 10px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
        .overall-total { font-weight: bold; margin-bottom: 20px; color: #333; display: flex; justify-content: space-between; }
        .category { margin-top: 20px; }
        .category h2 { margin-bottom: 5px; color: #333; }
        .category-total { font-weight: bold; margin-bottom: 10px; color: #555; }
        .items { display: flex; flex-wrap: wrap; }
        .item { flex: 1 1 45%; margin: 10px; padding: 10px; border-radius: 5px; box-shadow: 0 0 5px rgba(0,0,0,0.05); background: #f0f0f0; word-wrap: break-word; }
        .item:nth-of-type(odd) { background: #fafafa; }
        .item img { width: 100px; height: 100px; margin-right: 15px; border-radius: 5px; object-fit: cover; }
        .item-details div { margin-bottom: 5px; }
        @media (max-width: 600px) {
            .item img { width: 100%; height: auto; margin-bottom: 10px; }
        }"#;

/// Renders the catalog as a standalone HTML5 document.
///
/// Categories follow `category_order`, then any other stored categories
/// alphabetically. Empty categories are left out.
pub fn render_report(
    catalog: &Catalog,
    totals: &Totals,
    currencies: &ReportCurrencies,
    category_order: &[String],
) -> String {
    let mut lines = Vec::new();

    lines.push("<!DOCTYPE html>".to_string());
    lines.push(r#"<html lang="en">"#.to_string());
    lines.push("<head>".to_string());
    lines.push(r#"    <meta charset="UTF-8">"#.to_string());
    lines.push(
        r#"    <meta name="viewport" content="width=device-width, initial-scale=1">"#.to_string(),
    );
    lines.push("    <title>Product List</title>".to_string());
    lines.push("    <style>".to_string());
    lines.push(STYLE.to_string());
    lines.push("    </style>".to_string());
    lines.push("</head>".to_string());
    lines.push("<body>".to_string());
    lines.push(r#"<div class="container">"#.to_string());

    lines.push(r#"    <div class="overall-total">"#.to_string());
    for amount in total_amounts(&totals.overall, currencies) {
        lines.push(format!(
            "        <div>Total {}: {}</div>",
            code_of(&amount),
            text(&amount.to_string())
        ));
    }
    lines.push("    </div>".to_string());

    let empty = CategoryTotals::default();
    for (name, items) in ordered_categories(catalog, category_order) {
        let category_totals = totals.category(name).unwrap_or(&empty);
        render_category(&mut lines, name, items, category_totals, currencies);
    }

    lines.push("</div>".to_string());
    lines.push("</body>".to_string());
    lines.push("</html>".to_string());

    let mut html = lines.join("\n");
    html.push('\n');
    html
}

fn render_category(
    lines: &mut Vec<String>,
    name: &str,
    items: &Category,
    totals: &CategoryTotals,
    currencies: &ReportCurrencies,
) {
    let summary = total_amounts(totals, currencies)
        .iter()
        .map(Amount::to_string)
        .collect::<Vec<_>>()
        .join(" | ");

    lines.push(r#"    <div class="category">"#.to_string());
    lines.push(format!("        <h2>{}</h2>", text(name)));
    lines.push(format!(r#"        <div class="category-total">Total: {}</div>"#, text(&summary)));
    lines.push(r#"        <div class="items">"#.to_string());

    for group in group_items(items) {
        let record = group.record;
        lines.push(r#"            <div class="item">"#.to_string());
        lines.push(format!(
            r#"                <img src="{}" alt="{}" loading="lazy">"#,
            attr(&record.picture_url),
            attr(&record.name)
        ));
        lines.push(r#"                <div class="item-details">"#.to_string());
        lines.push(format!(
            "                    <div><strong>{}</strong></div>",
            text(&record.name)
        ));
        if group.quantity > 1 {
            lines.push(format!("                    <div>Quantity: {}</div>", group.quantity));
        }
        lines.push(format!(
            "                    <div>{} Price: {}</div>",
            text(&currencies.base),
            text(&group.price.to_string())
        ));
        for code in &currencies.targets {
            let price =
                group.exchange_price.get(code).map_or_else(|| "N/A".to_string(), Amount::to_string);
            lines.push(format!(
                "                    <div>{} Price: {}</div>",
                text(code),
                text(&price)
            ));
        }
        lines.push(format!(
            r#"                    <div><a href="{}" target="_blank">Product Link</a></div>"#,
            attr(&record.url)
        ));
        lines.push("                </div>".to_string());
        lines.push("            </div>".to_string());
    }

    lines.push("        </div>".to_string());
    lines.push("    </div>".to_string());
}

/// Base total followed by each target total.
fn total_amounts(totals: &CategoryTotals, currencies: &ReportCurrencies) -> Vec<Amount> {
    let mut amounts = vec![Amount::new(totals.original_total, currencies.base.as_str())];
    for code in &currencies.targets {
        amounts.push(Amount::new(totals.exchange_total(code), code.as_str()));
    }
    amounts
}

fn code_of(amount: &Amount) -> String {
    text(amount.currency.as_deref().unwrap_or_default()).into_owned()
}

/// Non-empty categories in configured order, then the rest alphabetically.
fn ordered_categories<'a>(catalog: &'a Catalog, order: &[String]) -> Vec<(&'a str, &'a Category)> {
    let mut ordered: Vec<(&str, &Category)> = Vec::new();

    for name in order {
        if let Some((key, items)) = catalog.get_key_value(name) {
            if !ordered.iter().any(|(k, _)| *k == key.as_str()) {
                ordered.push((key.as_str(), items));
            }
        }
    }

    for (key, items) in catalog {
        if !order.contains(key) {
            ordered.push((key.as_str(), items));
        }
    }

    ordered.retain(|(_, items)| !items.is_empty());
    ordered
}
