//! Category-grouped product persistence.

use crate::sites::models::{Catalog, ProductRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Storage for the product catalog - enables swapping backends in tests.
pub trait ProductStore: Send + Sync {
    /// Loads the whole catalog. Unreadable stores load as empty and unreadable
    /// records are left out.
    fn load(&self) -> Catalog;

    /// Replaces the stored catalog.
    fn save(&self, catalog: &Catalog) -> Result<()>;

    /// Adds a record under `category` and returns its new id.
    fn insert(&self, category: &str, record: ProductRecord) -> Result<u32> {
        let mut catalog = self.load();
        let items = catalog.entry(category.to_string()).or_default();
        let id = next_id(items.len(), items.keys().next_back().copied());
        items.insert(id, record);
        self.save(&catalog)?;
        debug!("Stored product {} under {}", id, category);
        Ok(id)
    }
}

/// Next free id: one past the record count, or past the highest id if
/// records were removed by hand and a higher id is still taken.
fn next_id(count: usize, max_id: Option<u32>) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX - 1);
    count.max(max_id.unwrap_or(0)) + 1
}

/// Pretty-printed JSON file store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    /// Where the original file is copied when part of it could not be read.
    fn backup_path(&self) -> PathBuf {
        self.sibling_path(".bak")
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Copies the current file aside before a later save can overwrite it.
    fn back_up(&self) {
        let backup = self.backup_path();
        match std::fs::copy(&self.path, &backup) {
            Ok(_) => warn!("Copied {} to {}", self.path.display(), backup.display()),
            Err(e) => warn!("Failed to back up {}: {}", self.path.display(), e),
        }
    }
}

/// Reads the catalog one record at a time. Returns the records that could be
/// read and how many entries were skipped.
fn parse_catalog(value: Value) -> (Catalog, usize) {
    let mut catalog = Catalog::new();
    let mut skipped = 0;

    let Value::Object(categories) = value else {
        warn!("Store root is not an object");
        return (catalog, 1);
    };

    for (name, items) in categories {
        let Value::Object(items) = items else {
            warn!("Skipping category '{}': not an object", name);
            skipped += 1;
            continue;
        };

        let category = catalog.entry(name.clone()).or_default();
        for (key, raw) in items {
            let Ok(id) = key.parse::<u32>() else {
                warn!("Skipping {} entry '{}': id is not a number", name, key);
                skipped += 1;
                continue;
            };

            match serde_json::from_value::<ProductRecord>(raw) {
                Ok(record) => {
                    category.insert(id, record);
                }
                Err(e) => {
                    warn!("Skipping {} #{}: {}", name, id, e);
                    skipped += 1;
                }
            }
        }
    }

    (catalog, skipped)
}

impl ProductStore for JsonFileStore {
    fn load(&self) -> Catalog {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.path.display());
                return Catalog::new();
            }
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return Catalog::new();
            }
        };

        if content.trim().is_empty() {
            debug!("Store {} is empty", self.path.display());
            return Catalog::new();
        }

        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse {}, starting empty: {}", self.path.display(), e);
                self.back_up();
                return Catalog::new();
            }
        };

        let (catalog, skipped) = parse_catalog(value);
        if skipped > 0 {
            warn!("Skipped {} unreadable entries in {}", skipped, self.path.display());
            self.back_up();
        }
        catalog
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(catalog).context("Failed to serialize catalog")?;

        let temp = self.temp_path();
        std::fs::write(&temp, json)
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        std::fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!("Saved catalog to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::Amount;
    use tempfile::TempDir;

    fn record(name: &str, price: f64) -> ProductRecord {
        ProductRecord::new(
            format!("https://www.ikea.com/se/sv/p/{}", name.to_lowercase()),
            name,
            Amount::new(price, "SEK"),
            "https://www.ikea.com/img.jpg",
        )
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_empty_and_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::new(&path);

        std::fs::write(&path, "  \n").unwrap();
        assert!(store.load().is_empty());

        std::fs::write(&path, "{ broken").unwrap();
        assert!(store.load().is_empty());
        assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), "{ broken");
    }

    #[test]
    fn test_bad_record_does_not_drop_neighbours() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let raw = r#"{
            "Kitchen": {
                "1": { "url": "https://www.ikea.com/se/sv/p/lampa", "name": "Lampa",
                       "price": "199.00 SEK", "picture_url": "https://www.ikea.com/a.jpg",
                       "exchange_price": null },
                "2": { "url": "https://www.ikea.com/se/sv/p/bord", "name": "Bord",
                       "price": "N/A", "picture_url": "https://www.ikea.com/b.jpg" },
                "3": { "url": "https://www.ikea.com/se/sv/p/hylla", "name": "Hylla",
                       "price": "349.00 SEK" },
                "x": { "name": "no id" }
            },
            "Bedroom": []
        }"#;
        std::fs::write(&path, raw).unwrap();
        let store = JsonFileStore::new(&path);

        let catalog = store.load();
        assert_eq!(catalog["Kitchen"].len(), 2);
        assert_eq!(catalog["Kitchen"][&1].name, "Lampa");
        assert_eq!(catalog["Kitchen"][&3].name, "Hylla");
        assert!(!catalog.contains_key("Bedroom"));
        assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), raw);

        let id = store.insert("Kitchen", record("Stol", 499.0)).unwrap();
        assert_eq!(id, 4);

        let after = store.load();
        let names: Vec<_> = after["Kitchen"].values().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Lampa", "Hylla", "Stol"]);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db").join("data.json");
        let store = JsonFileStore::new(&path);

        store.save(&Catalog::new()).unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));

        assert_eq!(store.insert("Kitchen", record("Lampa", 199.0)).unwrap(), 1);
        assert_eq!(store.insert("Kitchen", record("Bord", 999.0)).unwrap(), 2);
        assert_eq!(store.insert("Bedroom", record("Säng", 2495.0)).unwrap(), 1);

        let catalog = store.load();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["Kitchen"].len(), 2);
        assert_eq!(catalog["Kitchen"][&1].name, "Lampa");
        assert_eq!(catalog["Kitchen"][&2].name, "Bord");
        assert_eq!(catalog["Bedroom"][&1].name, "Säng");
    }

    #[test]
    fn test_round_trip_keeps_prior_records() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));

        for i in 0..4 {
            store.insert("Extra", record(&format!("Item{i}"), 10.0 * f64::from(i))).unwrap();
        }
        let before = store.load();

        let id = store.insert("Extra", record("New", 1.0)).unwrap();
        let after = store.load();

        assert_eq!(id, 5);
        for (id, prior) in &before["Extra"] {
            assert_eq!(&after["Extra"][id], prior);
        }
    }

    #[test]
    fn test_insert_after_manual_deletion() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));

        store.insert("Kitchen", record("A", 1.0)).unwrap();
        store.insert("Kitchen", record("B", 2.0)).unwrap();
        store.insert("Kitchen", record("C", 3.0)).unwrap();

        let mut catalog = store.load();
        catalog.get_mut("Kitchen").unwrap().remove(&1);
        store.save(&catalog).unwrap();

        // Count is 2 but id 3 is taken
        assert_eq!(store.insert("Kitchen", record("D", 4.0)).unwrap(), 4);
    }

    #[test]
    fn test_saved_file_is_readable_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::new(&path);

        store.insert("Living Room", record("Soffa", 4999.0)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["Living Room"]["1"]["price"], "4999.00 SEK");
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(0, None), 1);
        assert_eq!(next_id(3, Some(3)), 4);
        assert_eq!(next_id(2, Some(7)), 8);
        assert_eq!(next_id(5, Some(2)), 6);
    }
}
