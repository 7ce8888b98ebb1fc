//! Postgres-backed price time series

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

use super::entities::price_samples;
use crate::domain::price::{PriceRepository, PriceSample};
use crate::shared::errors::RepositoryError;
use crate::shared::types::{Chain, Clock};

pub struct PostgresPriceRepository {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl PostgresPriceRepository {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

fn into_sample(model: price_samples::Model) -> PriceSample {
    PriceSample {
        chain: Chain::new(model.chain),
        price: model.price,
        observed_at: model.observed_at,
    }
}

#[async_trait]
impl PriceRepository for PostgresPriceRepository {
    async fn save(&self, chain: &Chain, price: Decimal) -> Result<PriceSample, RepositoryError> {
        let model = price_samples::ActiveModel {
            id: NotSet,
            chain: Set(chain.as_str().to_string()),
            price: Set(price),
            observed_at: Set(self.clock.now()),
        };
        let stored = model
            .insert(&self.db)
            .await
            .map_err(|e| RepositoryError::WriteRejected(e.to_string()))?;
        Ok(into_sample(stored))
    }

    async fn find_latest_before(
        &self,
        chain: &Chain,
        before: DateTime<Utc>,
    ) -> Result<Option<PriceSample>, RepositoryError> {
        let latest = price_samples::Entity::find()
            .filter(price_samples::Column::Chain.eq(chain.as_str()))
            .filter(price_samples::Column::ObservedAt.lt(before))
            .order_by_desc(price_samples::Column::ObservedAt)
            .one(&self.db)
            .await?;
        Ok(latest.map(into_sample))
    }

    async fn find_since(
        &self,
        chain: &Chain,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceSample>, RepositoryError> {
        let recent = price_samples::Entity::find()
            .filter(price_samples::Column::Chain.eq(chain.as_str()))
            .filter(price_samples::Column::ObservedAt.gt(since))
            .order_by_asc(price_samples::Column::ObservedAt)
            .all(&self.db)
            .await?;
        Ok(recent.into_iter().map(into_sample).collect())
    }
}
