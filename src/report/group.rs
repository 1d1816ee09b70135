//! Grouping of identical products within a category.

use crate::price::Amount;
use crate::sites::models::{Category, ProductRecord};
use std::collections::BTreeMap;

/// One report card: a product and how many times it was added.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup<'a> {
    /// First record with this name, used for name, image and link
    pub record: &'a ProductRecord,
    pub quantity: usize,
    /// Base price summed over the group
    pub price: Amount,
    /// Converted prices summed over the group, only for currencies every
    /// member has
    pub exchange_price: BTreeMap<String, Amount>,
}

/// Lower-cases, trims and collapses whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Groups records by normalized name, keeping first-seen (id) order.
pub fn group_items(items: &Category) -> Vec<ItemGroup<'_>> {
    let mut groups: Vec<ItemGroup<'_>> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for record in items.values() {
        let key = normalize_name(&record.name);
        match index.get(&key) {
            Some(&i) => {
                let group = &mut groups[i];
                group.quantity += 1;
                group.price.value += record.price.value;
                group.exchange_price.retain(|code, sum| match record.exchange_for(code) {
                    Some(amount) => {
                        sum.value += amount.value;
                        true
                    }
                    None => false,
                });
            }
            None => {
                index.insert(key, groups.len());
                groups.push(ItemGroup {
                    record,
                    quantity: 1,
                    price: record.price.clone(),
                    exchange_price: record.exchange_price.clone(),
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: f64) -> ProductRecord {
        let mut record = ProductRecord::new(
            "https://www.ikea.com/p",
            name,
            Amount::new(price, "SEK"),
            "https://www.ikea.com/i.jpg",
        );
        record.exchange_price.insert("GBP".to_string(), Amount::new(price / 10.0, "GBP"));
        record
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  KALLAX   Hylla\n vit "), "kallax hylla vit");
    }

    #[test]
    fn test_identical_names_grouped() {
        let items = Category::from([
            (1, record("Stol", 100.0)),
            (2, record("Bord", 500.0)),
            (3, record(" stol ", 100.0)),
            (4, record("STOL", 100.0)),
        ]);

        let groups = group_items(&items);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].record.name, "Stol");
        assert_eq!(groups[0].quantity, 3);
        assert_eq!(groups[0].price.to_string(), "300.00 SEK");
        assert_eq!(groups[0].exchange_price["GBP"].to_string(), "30.00 GBP");

        assert_eq!(groups[1].record.name, "Bord");
        assert_eq!(groups[1].quantity, 1);
        assert_eq!(groups[1].price.to_string(), "500.00 SEK");
    }

    #[test]
    fn test_partly_converted_group_has_no_total() {
        let mut unconverted = record("Stol", 100.0);
        unconverted.exchange_price.clear();
        let mut bord_in_euro = record("Bord", 500.0);
        bord_in_euro.exchange_price.insert("EUR".to_string(), Amount::new(43.5, "EUR"));

        let items = Category::from([
            (1, record("Stol", 100.0)),
            (2, record("stol", 100.0)),
            (3, bord_in_euro),
            (4, unconverted),
            (5, record("Bord", 500.0)),
        ]);

        let groups = group_items(&items);
        assert_eq!(groups[0].quantity, 3);
        assert_eq!(groups[0].price.to_string(), "300.00 SEK");
        assert!(groups[0].exchange_price.is_empty());

        assert_eq!(groups[1].quantity, 2);
        assert_eq!(groups[1].exchange_price["GBP"].to_string(), "100.00 GBP");
        assert!(!groups[1].exchange_price.contains_key("EUR"));
    }
}
