//! In-memory price time series

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::price::{PriceRepository, PriceSample};
use crate::shared::errors::RepositoryError;
use crate::shared::types::{Chain, Clock};

/// Per-chain append-only sample log.
///
/// Each chain's log is kept ordered by `observed_at` so lookups can binary
/// search it.
pub struct InMemoryPriceRepository {
    clock: Arc<dyn Clock>,
    samples: RwLock<HashMap<Chain, Vec<PriceSample>>>,
}

impl InMemoryPriceRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            samples: RwLock::new(HashMap::new()),
        }
    }

    pub async fn count(&self, chain: &Chain) -> usize {
        self.samples.read().await.get(chain).map_or(0, Vec::len)
    }
}

#[async_trait]
impl PriceRepository for InMemoryPriceRepository {
    async fn save(&self, chain: &Chain, price: Decimal) -> Result<PriceSample, RepositoryError> {
        let sample = PriceSample {
            chain: chain.clone(),
            price,
            observed_at: self.clock.now(),
        };
        let mut samples = self.samples.write().await;
        let series = samples.entry(chain.clone()).or_default();
        // a wall clock stepping backwards must not break the ordering
        let at = series.partition_point(|s| s.observed_at <= sample.observed_at);
        series.insert(at, sample.clone());
        Ok(sample)
    }

    async fn find_latest_before(
        &self,
        chain: &Chain,
        before: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, RepositoryError> {
        let samples = self.samples.read().await;
        let Some(series) = samples.get(chain) else {
            return Ok(None);
        };
        let end = series.partition_point(|s| s.observed_at < before);
        Ok(end.checked_sub(1).map(|i| series[i].clone()))
    }

    async fn find_since(
        &self,
        chain: &Chain,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceSample>, RepositoryError> {
        let samples = self.samples.read().await;
        let Some(series) = samples.get(chain) else {
            return Ok(Vec::new());
        };
        let start = series.partition_point(|s| s.observed_at <= since);
        Ok(series[start..].to_vec())
    }
}
