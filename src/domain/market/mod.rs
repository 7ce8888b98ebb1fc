//! Market data domain - snapshot of asset prices from an external provider

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::errors::MarketDataError;
use crate::shared::types::Chain;

/// One asset in a market data snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAsset {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub usd_price: Option<Decimal>,
}

/// Provider of point-in-time USD prices
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<MarketAsset>, MarketDataError>;
}

/// Resolve a chain's USD price in a snapshot by case-insensitive name.
/// Entries without a price count as absent.
pub fn find_chain_price(snapshot: &[MarketAsset], chain: &Chain) -> Option<Decimal> {
    snapshot
        .iter()
        .find(|asset| chain.matches(&asset.name))
        .and_then(|asset| asset.usd_price)
}
