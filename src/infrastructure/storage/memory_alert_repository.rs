//! In-memory alert subscriptions keyed by `(chain, email)`

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::alert::{AlertRepository, AlertSubscription};
use crate::shared::errors::RepositoryError;
use crate::shared::types::Chain;

#[derive(Default)]
pub struct InMemoryAlertRepository {
    subscriptions: RwLock<HashMap<(Chain, String), AlertSubscription>>,
}

impl InMemoryAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn find_by_chain_and_email(
        &self,
        chain: &Chain,
        email: &str,
    ) -> Result<Option<AlertSubscription>, RepositoryError> {
        let key = (chain.clone(), email.to_string());
        Ok(self.subscriptions.read().await.get(&key).cloned())
    }

    async fn find_by_chain(&self, chain: &Chain) -> Result<Vec<AlertSubscription>, RepositoryError> {
        let mut found: Vec<AlertSubscription> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| &s.chain == chain)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.email.cmp(&b.email)));
        Ok(found)
    }

    async fn save(&self, subscription: AlertSubscription) -> Result<AlertSubscription, RepositoryError> {
        let key = (subscription.chain.clone(), subscription.email.clone());
        self.subscriptions.write().await.insert(key, subscription.clone());
        Ok(subscription)
    }
}
