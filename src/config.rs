//! Configuration management with JSON/TOML files, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Categories products can be filed under, in report order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Currency conversion settings
    #[serde(default)]
    pub convert_original_currency: ConversionConfig,

    /// Rescan all stored prices when the interactive menu starts
    #[serde(default)]
    pub enable_auto_scan: bool,

    /// Path of the JSON product store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Path of the exported HTML report
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Page fetching settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Exchange rate API key (environment only, never read from or written to files)
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Base/target currencies for conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Currency the shops quote prices in
    #[serde(
        rename = "ExchangeFrom",
        default = "default_base_currency",
        deserialize_with = "currency_code"
    )]
    pub exchange_from: String,

    /// One or more currencies to convert into
    #[serde(
        rename = "ExchangeTo",
        default = "default_target_currencies",
        deserialize_with = "one_or_many"
    )]
    pub exchange_to: Vec<String>,

    /// Whether to convert at all
    #[serde(rename = "enableConversion", default = "default_true")]
    pub enable_conversion: bool,
}

/// Retry and timeout settings for product page requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    /// Total attempts per page
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_categories() -> Vec<String> {
    ["Kitchen", "Living Room", "Bedroom", "Bathroom", "Extra"].map(String::from).to_vec()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./db/data.json")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("product_list.html")
}

fn default_base_currency() -> String {
    "SEK".to_string()
}

fn default_target_currencies() -> Vec<String> {
    vec!["GBP".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_timeout_secs() -> u64 {
    10
}

/// Reads one currency code as trimmed upper case; blank falls back to the default.
fn currency_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let code = String::deserialize(deserializer)?.trim().to_uppercase();
    Ok(if code.is_empty() { default_base_currency() } else { code })
}

/// Accepts `"GBP"` as well as `["GBP", "EUR"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let codes = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(code) => vec![code],
        OneOrMany::Many(codes) => codes,
    };

    Ok(codes.into_iter().map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty()).collect())
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            exchange_from: default_base_currency(),
            exchange_to: default_target_currencies(),
            enable_conversion: true,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            convert_original_currency: ConversionConfig::default(),
            enable_auto_scan: false,
            store_path: default_store_path(),
            report_path: default_report_path(),
            fetch: FetchConfig::default(),
            api_key: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file. `.toml` files are read as TOML,
    /// everything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        }
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        for name in ["config.json", "config.toml"] {
            let local_config = Path::new(name);
            if local_config.exists() {
                debug!("Found {} in current directory", name);
                return Self::from_file(local_config);
            }
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("price-tracker").join("config.json");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("EXCHANGE_RATE_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(store) = std::env::var("PRICE_TRACKER_STORE") {
            self.store_path = PathBuf::from(store);
        }

        if let Ok(report) = std::env::var("PRICE_TRACKER_REPORT") {
            self.report_path = PathBuf::from(report);
        }

        if let Ok(delay) = std::env::var("PRICE_TRACKER_DELAY") {
            if let Ok(d) = delay.parse() {
                self.fetch.retry_delay_ms = d;
            }
        }

        self
    }

    /// Returns the currency shop prices are quoted in.
    pub fn base_currency(&self) -> &str {
        &self.convert_original_currency.exchange_from
    }

    /// Returns the currencies to convert into, or none when conversion is off.
    pub fn target_currencies(&self) -> &[String] {
        if self.convert_original_currency.enable_conversion {
            &self.convert_original_currency.exchange_to
        } else {
            &[]
        }
    }

    /// Returns the configured spelling of `name`, matched case-insensitively.
    pub fn find_category(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.categories.iter().find(|c| c.eq_ignore_ascii_case(name)).map(String::as_str)
    }
}
