//! Price domain - time series storage and hourly aggregation

mod hourly_aggregator;
mod price_repository;

pub use hourly_aggregator::{bucket_by_hour, HourlyAggregator};
pub use price_repository::PriceRepository;

use crate::shared::types::Chain;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One observed USD price for a chain. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSample {
    pub chain: Chain,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Average price for one hour-of-day bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPrice {
    pub hour: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
}

/// Hourly view for a single chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHourlyPrices {
    pub chain: Chain,
    pub hourly_prices: Vec<HourlyPrice>,
}
