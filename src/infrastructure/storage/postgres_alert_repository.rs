//! Postgres-backed alert subscriptions

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::entities::alert_subscriptions;
use crate::domain::alert::{AlertRepository, AlertSubscription};
use crate::shared::errors::RepositoryError;
use crate::shared::types::Chain;

pub struct PostgresAlertRepository {
    db: DatabaseConnection,
}

impl PostgresAlertRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_subscription(model: alert_subscriptions::Model) -> AlertSubscription {
    AlertSubscription {
        id: model.id,
        chain: Chain::new(model.chain),
        email: model.email,
        target_price: model.target_price,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl AlertRepository for PostgresAlertRepository {
    async fn find_by_chain_and_email(
        &self,
        chain: &Chain,
        email: &str,
    ) -> Result<Option<AlertSubscription>, RepositoryError> {
        let found = alert_subscriptions::Entity::find()
            .filter(alert_subscriptions::Column::Chain.eq(chain.as_str()))
            .filter(alert_subscriptions::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(found.map(into_subscription))
    }

    async fn find_by_chain(&self, chain: &Chain) -> Result<Vec<AlertSubscription>, RepositoryError> {
        let found = alert_subscriptions::Entity::find()
            .filter(alert_subscriptions::Column::Chain.eq(chain.as_str()))
            .order_by_asc(alert_subscriptions::Column::CreatedAt)
            .order_by_asc(alert_subscriptions::Column::Email)
            .all(&self.db)
            .await?;
        Ok(found.into_iter().map(into_subscription).collect())
    }

    /// Upsert on `(chain, email)`. An existing row keeps its id and
    /// creation time, only the target and update time change.
    async fn save(&self, subscription: AlertSubscription) -> Result<AlertSubscription, RepositoryError> {
        let model = alert_subscriptions::ActiveModel {
            id: Set(subscription.id),
            chain: Set(subscription.chain.as_str().to_string()),
            email: Set(subscription.email.clone()),
            target_price: Set(subscription.target_price),
            created_at: Set(subscription.created_at),
            updated_at: Set(subscription.updated_at),
        };
        alert_subscriptions::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([alert_subscriptions::Column::Chain, alert_subscriptions::Column::Email])
                    .update_columns([
                        alert_subscriptions::Column::TargetPrice,
                        alert_subscriptions::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| RepositoryError::WriteRejected(e.to_string()))?;

        self.find_by_chain_and_email(&subscription.chain, &subscription.email)
            .await?
            .ok_or_else(|| RepositoryError::WriteRejected("upserted subscription is missing".to_string()))
    }
}
