use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::market::{MarketAsset, MarketDataSource};
use crate::shared::errors::MarketDataError;
use crate::shared::utils::mask_url;

const TOP_BY_MARKET_CAP_PATH: &str = "/market-data/global/market-cap";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Moralis EVM API client for the top cryptocurrencies by market cap
pub struct MoralisMarketData {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MoralisMarketData {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Moralis API initialized ({})", mask_url(&base_url));
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn snapshot_url(&self) -> String {
        format!("{}{}", self.base_url, TOP_BY_MARKET_CAP_PATH)
    }
}

#[async_trait]
impl MarketDataSource for MoralisMarketData {
    async fn fetch_snapshot(&self) -> Result<Vec<MarketAsset>, MarketDataError> {
        let response = self
            .client
            .get(self.snapshot_url())
            .header("X-API-Key", &self.api_key)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status(status.as_u16()));
        }

        let snapshot: Vec<MarketAsset> = response.json().await?;
        debug!("Fetched {} assets from Moralis", snapshot.len());
        Ok(snapshot)
    }
}
