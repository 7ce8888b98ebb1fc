//! Price repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::PriceSample;
use crate::shared::errors::RepositoryError;
use crate::shared::types::Chain;

/// Append-only store of price samples
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Append a sample stamped with the current time
    async fn save(&self, chain: &Chain, price: Decimal) -> Result<PriceSample, RepositoryError>;

    /// Most recent sample observed strictly before `before`
    async fn find_latest_before(
        &self,
        chain: &Chain,
        before: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, RepositoryError>;

    /// Samples observed strictly after `since`, oldest first
    async fn find_since(
        &self,
        chain: &Chain,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceSample>, RepositoryError>;
}
