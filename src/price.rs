//! Locale-tolerant price parsing and the structured `Amount` type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Parses a scraped price string into a number.
///
/// Accepts either `,` or `.` as the decimal separator. When both appear, the
/// later one is the decimal separator and the other is dropped as a
/// thousands separator. Currency symbols, units ("kr", "SEK", ":-") and
/// non-breaking spaces are ignored.
///
/// Returns `None` (and logs) when nothing numeric is left.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: Vec<char> =
        text.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',').collect();

    // A separator not followed by a digit is an artifact ("199:-", "49.-").
    let mut kept = String::with_capacity(cleaned.len());
    for (i, c) in cleaned.iter().enumerate() {
        let is_separator = *c == '.' || *c == ',';
        if is_separator && !cleaned.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
            continue;
        }
        kept.push(*c);
    }

    let normalized = match (kept.rfind('.'), kept.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => kept.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => kept.replace(',', ""),
        (None, Some(_)) => kept.replace(',', "."),
        _ => kept,
    };

    match normalized.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Failed to parse the price from '{}'", text.trim());
            None
        }
    }
}

/// A monetary value with an optional ISO currency code.
///
/// Serialized as `"199.00 SEK"` (or `"199.00"` without a currency) so the
/// store file keeps its human-readable form.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount {
    pub value: f64,
    pub currency: Option<String>,
}

impl Amount {
    /// Creates an amount in the given currency. The code is stored upper-cased,
    /// matching what `FromStr` produces.
    pub fn new(value: f64, currency: impl Into<String>) -> Self {
        Self { value, currency: Some(currency.into().trim().to_uppercase()) }
    }

    /// Creates an amount with no currency attached.
    pub fn bare(value: f64) -> Self {
        Self { value, currency: None }
    }

    /// Whether both amounts show the same price: equal to the cent, in the
    /// same currency regardless of case.
    pub fn same_price(&self, other: &Amount) -> bool {
        let cents = |a: &Amount| (a.value * 100.0).round() as i64;
        let same_currency = match (&self.currency, &other.currency) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        same_currency && cents(self) == cents(other)
    }

    /// Converts into another currency using `rate` (units of target per unit of self).
    pub fn convert(&self, rate: f64, target: impl Into<String>) -> Self {
        Self::new(self.value * rate, target)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.currency {
            Some(code) => write!(f, "{:.2} {}", self.value, code),
            None => write!(f, "{:.2}", self.value),
        }
    }
}

/// Error for strings that are not `"<number> [CODE]"`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid amount '{0}'. Expected a number optionally followed by a currency code")]
pub struct AmountParseError(String);

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let value = parts
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| AmountParseError(s.to_string()))?;

        let currency = parts.next().map(str::to_uppercase);
        if parts.next().is_some() {
            return Err(AmountParseError(s.to_string()));
        }

        Ok(Self { value, currency })
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Number(value) => Ok(Amount::bare(value)),
        }
    }
}
