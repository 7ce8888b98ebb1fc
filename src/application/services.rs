//! Application services exposed to the API layer

use futures::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::alert::{AlertRepository, AlertSubscription};
use crate::domain::price::{ChainHourlyPrices, HourlyAggregator};
use crate::shared::errors::ServiceError;
use crate::shared::types::{Chain, Clock};

/// Read side (hourly averages) and write side (target-price subscriptions)
pub struct PriceService {
    chains: Vec<Chain>,
    aggregator: HourlyAggregator,
    alerts: Arc<dyn AlertRepository>,
    clock: Arc<dyn Clock>,
}

impl PriceService {
    pub fn new(
        chains: Vec<Chain>,
        aggregator: HourlyAggregator,
        alerts: Arc<dyn AlertRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chains,
            aggregator,
            alerts,
            clock,
        }
    }

    /// One entry per configured chain, in configured order. A chain whose
    /// history cannot be read comes back with no buckets.
    pub async fn get_hourly_prices(&self) -> Vec<ChainHourlyPrices> {
        let lookups = self.chains.iter().map(|chain| async move {
            ChainHourlyPrices {
                chain: chain.clone(),
                hourly_prices: self.aggregator.hourly_prices(chain).await,
            }
        });
        join_all(lookups).await
    }

    /// Create a subscription for `(chain, email)` or move its target
    pub async fn set_alert(
        &self,
        chain: &str,
        target_price: Decimal,
        email: &str,
    ) -> Result<AlertSubscription, ServiceError> {
        let chain = Chain::new(chain);
        let email = email.trim();
        validate_alert(&chain, target_price, email)?;

        let result = self.upsert(&chain, target_price, email).await;
        match &result {
            Ok(saved) => info!("Alert set: {} >= ${} for {}", chain, saved.target_price, email),
            Err(e) => error!("Error setting alert for chain {}: {}", chain, e),
        }
        result
    }

    async fn upsert(
        &self,
        chain: &Chain,
        target_price: Decimal,
        email: &str,
    ) -> Result<AlertSubscription, ServiceError> {
        let now = self.clock.now();
        let subscription = match self.alerts.find_by_chain_and_email(chain, email).await? {
            Some(mut existing) => {
                existing.retarget(target_price, now);
                existing
            }
            None => AlertSubscription::new(chain.clone(), email, target_price, now),
        };
        Ok(self.alerts.save(subscription).await?)
    }
}

fn validate_alert(chain: &Chain, target_price: Decimal, email: &str) -> Result<(), ServiceError> {
    if chain.is_empty() {
        return Err(ServiceError::Validation("chain must not be empty".to_string()));
    }
    if target_price.is_sign_negative() && !target_price.is_zero() {
        return Err(ServiceError::Validation("price must not be negative".to_string()));
    }
    if !is_plausible_email(email) {
        return Err(ServiceError::Validation(format!("invalid email address: {email}")));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
