//! Alert domain - target-price subscriptions and the two alert rules

mod alert_repository;
mod threshold_evaluator;
mod trend_evaluator;

pub use alert_repository::AlertRepository;
pub use threshold_evaluator::ThresholdAlertEvaluator;
pub use trend_evaluator::{TrendAlertConfig, TrendAlertEvaluator, TrendOutcome};

use crate::shared::types::Chain;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A subscriber's target price for one chain.
///
/// `(chain, email)` is the natural key; there is at most one subscription
/// per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSubscription {
    pub id: Uuid,
    pub chain: Chain,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlertSubscription {
    pub fn new(chain: Chain, email: impl Into<String>, target_price: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chain,
            email: email.into(),
            target_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point an existing subscription at a new target
    pub fn retarget(&mut self, target_price: Decimal, now: DateTime<Utc>) {
        self.target_price = target_price;
        self.updated_at = now;
    }

    /// Target reached when the price is at or above it
    pub fn is_reached_by(&self, price: Decimal) -> bool {
        price >= self.target_price
    }
}
