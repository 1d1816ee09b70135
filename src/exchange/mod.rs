//! Currency conversion through an exchange rate API.

pub mod client;
pub mod converter;

pub use client::{ExchangeRateClient, RateSource};
pub use converter::Converter;
