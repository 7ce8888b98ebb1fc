//! Alert repository interface

use async_trait::async_trait;

use super::AlertSubscription;
use crate::shared::errors::RepositoryError;
use crate::shared::types::Chain;

/// Store of target-price subscriptions.
///
/// Implementations own the `(chain, email)` uniqueness rule: saving a
/// subscription for an existing pair replaces the stored one.
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn find_by_chain_and_email(
        &self,
        chain: &Chain,
        email: &str,
    ) -> Result<Option<AlertSubscription>, RepositoryError>;

    async fn find_by_chain(&self, chain: &Chain) -> Result<Vec<AlertSubscription>, RepositoryError>;

    async fn save(&self, subscription: AlertSubscription) -> Result<AlertSubscription, RepositoryError>;
}
