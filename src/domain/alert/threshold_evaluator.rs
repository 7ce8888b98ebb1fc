//! Target-price alert
//!
//! Every subscription whose target is at or below the current price gets
//! one email per tick. Subscriptions are not marked as fired, so they keep
//! firing while the condition holds.

use futures::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::AlertRepository;
use crate::domain::notify::Notifier;
use crate::shared::errors::RepositoryError;
use crate::shared::types::Chain;

pub struct ThresholdAlertEvaluator {
    alerts: Arc<dyn AlertRepository>,
    notifier: Arc<Notifier>,
}

impl ThresholdAlertEvaluator {
    pub fn new(alerts: Arc<dyn AlertRepository>, notifier: Arc<Notifier>) -> Self {
        Self { alerts, notifier }
    }

    /// Returns the number of subscribers notified
    pub async fn evaluate(&self, chain: &Chain, current_price: Decimal) -> Result<usize, RepositoryError> {
        let subscriptions = self.alerts.find_by_chain(chain).await?;

        let sends = subscriptions
            .iter()
            .filter(|sub| sub.is_reached_by(current_price))
            .map(|sub| {
                let subject = format!("{} Price Alert", chain);
                let body = format!("{} has reached the target price of ${}", chain, sub.target_price);
                async move { self.notifier.send(&sub.email, &subject, &body).await }
            });

        Ok(join_all(sends).await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::AlertSubscription;
    use crate::domain::notify::MailTransport;
    use crate::infrastructure::storage::InMemoryAlertRepository;
    use crate::testing::{FailingTransport, RecordingTransport};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    async fn subscribe(repo: &InMemoryAlertRepository, chain: &str, email: &str, target: Decimal) {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        repo.save(AlertSubscription::new(Chain::new(chain), email, target, now))
            .await
            .unwrap();
    }

    fn evaluator(
        repo: Arc<InMemoryAlertRepository>,
        transports: Vec<Arc<dyn MailTransport>>,
    ) -> ThresholdAlertEvaluator {
        ThresholdAlertEvaluator::new(repo, Arc::new(Notifier::new(transports)))
    }

    #[tokio::test]
    async fn test_notifies_every_reached_subscription() {
        let repo = Arc::new(InMemoryAlertRepository::new());
        subscribe(&repo, "ethereum", "low@example.com", dec!(2500)).await;
        subscribe(&repo, "ethereum", "exact@example.com", dec!(3000)).await;
        subscribe(&repo, "ethereum", "high@example.com", dec!(3500)).await;
        let mail = Arc::new(RecordingTransport::default());

        let notified = evaluator(repo, vec![mail.clone()])
            .evaluate(&Chain::new("ethereum"), dec!(3000))
            .await
            .unwrap();

        assert_eq!(notified, 2);
        assert_eq!(mail.sent_to("low@example.com").len(), 1);
        assert_eq!(mail.sent_to("exact@example.com").len(), 1);
        assert!(mail.sent_to("high@example.com").is_empty());

        let msg = &mail.sent_to("exact@example.com")[0];
        assert_eq!(msg.subject, "ethereum Price Alert");
        assert_eq!(msg.body, "ethereum has reached the target price of $3000");
    }

    #[tokio::test]
    async fn test_below_target_stays_quiet() {
        let repo = Arc::new(InMemoryAlertRepository::new());
        subscribe(&repo, "ethereum", "a@example.com", dec!(4000)).await;
        let mail = Arc::new(RecordingTransport::default());

        let notified = evaluator(repo, vec![mail.clone()])
            .evaluate(&Chain::new("ethereum"), dec!(3999.99))
            .await
            .unwrap();

        assert_eq!(notified, 0);
        assert!(mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_only_subscriptions_for_the_chain() {
        let repo = Arc::new(InMemoryAlertRepository::new());
        subscribe(&repo, "bitcoin", "a@example.com", dec!(1)).await;
        let mail = Arc::new(RecordingTransport::default());

        let notified = evaluator(repo, vec![mail.clone()])
            .evaluate(&Chain::new("ethereum"), dec!(1000))
            .await
            .unwrap();

        assert_eq!(notified, 0);
        assert!(mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fires_again_on_next_tick() {
        let repo = Arc::new(InMemoryAlertRepository::new());
        subscribe(&repo, "ethereum", "a@example.com", dec!(100)).await;
        let mail = Arc::new(RecordingTransport::default());
        let evaluator = evaluator(repo, vec![mail.clone()]);

        evaluator.evaluate(&Chain::new("ethereum"), dec!(150)).await.unwrap();
        evaluator.evaluate(&Chain::new("ethereum"), dec!(150)).await.unwrap();

        assert_eq!(mail.sent_to("a@example.com").len(), 2);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let repo = Arc::new(InMemoryAlertRepository::new());
        subscribe(&repo, "ethereum", "a@example.com", dec!(100)).await;
        subscribe(&repo, "ethereum", "b@example.com", dec!(100)).await;

        let notified = evaluator(repo, vec![Arc::new(FailingTransport)])
            .evaluate(&Chain::new("ethereum"), dec!(150))
            .await
            .unwrap();

        assert_eq!(notified, 2);
    }
}
