//! Hourly price aggregation
//!
//! Samples from the trailing window are grouped by hour-of-day (0-23) in
//! local time. Samples from different calendar days that share an hour land
//! in the same bucket.

use chrono::{Duration, Local, TimeZone, Timelike};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

use super::{HourlyPrice, PriceRepository, PriceSample};
use crate::shared::errors::RepositoryError;
use crate::shared::types::{Chain, Clock};
use crate::shared::utils::round_2dp;

/// Reduces recent samples into per-hour averages
pub struct HourlyAggregator {
    prices: Arc<dyn PriceRepository>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl HourlyAggregator {
    pub fn new(prices: Arc<dyn PriceRepository>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self { prices, clock, window }
    }

    /// Hourly averages for `chain`; empty when the repository cannot be read
    pub async fn hourly_prices(&self, chain: &Chain) -> Vec<HourlyPrice> {
        match self.try_hourly_prices(chain).await {
            Ok(hourly) => hourly,
            Err(e) => {
                error!("Error getting hourly prices for chain {}: {}", chain, e);
                Vec::new()
            }
        }
    }

    pub async fn try_hourly_prices(&self, chain: &Chain) -> Result<Vec<HourlyPrice>, RepositoryError> {
        let since = self.clock.now() - self.window;
        let samples = self.prices.find_since(chain, since).await?;
        Ok(bucket_by_hour(&samples, &Local))
    }
}

/// Group samples by hour-of-day in `tz` and average each bucket.
/// Buckets come out in ascending hour order.
pub fn bucket_by_hour<Tz: TimeZone>(samples: &[PriceSample], tz: &Tz) -> Vec<HourlyPrice> {
    let mut buckets: BTreeMap<u32, (Decimal, u32)> = BTreeMap::new();

    for sample in samples {
        let hour = sample.observed_at.with_timezone(tz).hour();
        let (sum, count) = buckets.entry(hour).or_insert((Decimal::ZERO, 0));
        *sum += sample.price;
        *count += 1;
    }

    buckets
        .into_iter()
        .map(|(hour, (sum, count))| HourlyPrice {
            hour,
            average_price: round_2dp(sum / Decimal::from(count)),
        })
        .collect()
}
