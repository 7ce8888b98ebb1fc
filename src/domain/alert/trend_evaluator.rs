//! Rolling price-increase alert
//!
//! Compares the current price to the latest sample older than the lookback
//! and mails the administrator when the increase exceeds the threshold.
//! There is no suppression window: a sustained rise fires on every tick
//! for as long as the comparison still clears the threshold.

use chrono::Duration;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::domain::notify::Notifier;
use crate::domain::price::PriceRepository;
use crate::shared::errors::RepositoryError;
use crate::shared::types::{Chain, Clock};
use crate::shared::utils::{calculate_percentage_change, round_2dp};

#[derive(Debug, Clone)]
pub struct TrendAlertConfig {
    /// Percentage the price must rise by, exclusive
    pub threshold_pct: Decimal,
    pub lookback: Duration,
}

impl Default for TrendAlertConfig {
    fn default() -> Self {
        Self {
            threshold_pct: Decimal::new(3, 0),
            lookback: Duration::hours(1),
        }
    }
}

/// Result of a single trend check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendOutcome {
    /// No sample older than the lookback yet
    InsufficientHistory,
    /// The reference price was zero, or too small to compare against
    ZeroReference,
    BelowThreshold { increase_pct: Decimal },
    Notified { increase_pct: Decimal },
}

pub struct TrendAlertEvaluator {
    prices: Arc<dyn PriceRepository>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    admin_email: String,
    config: TrendAlertConfig,
}

impl TrendAlertEvaluator {
    pub fn new(
        prices: Arc<dyn PriceRepository>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
        admin_email: impl Into<String>,
        config: TrendAlertConfig,
    ) -> Self {
        Self {
            prices,
            notifier,
            clock,
            admin_email: admin_email.into(),
            config,
        }
    }

    pub async fn evaluate(&self, chain: &Chain, current_price: Decimal) -> Result<TrendOutcome, RepositoryError> {
        let cutoff = self.clock.now() - self.config.lookback;
        let Some(past) = self.prices.find_latest_before(chain, cutoff).await? else {
            debug!("No {} sample older than {} yet", chain, cutoff);
            return Ok(TrendOutcome::InsufficientHistory);
        };

        let Some(change) = calculate_percentage_change(past.price, current_price) else {
            debug!("Skipping trend check for {}: reference price is zero", chain);
            return Ok(TrendOutcome::ZeroReference);
        };
        let increase_pct = round_2dp(change);

        if change <= self.config.threshold_pct {
            return Ok(TrendOutcome::BelowThreshold { increase_pct });
        }

        let subject = format!(
            "{} Price Alert: {}% Increase",
            chain,
            self.config.threshold_pct.normalize()
        );
        let body = format!(
            "{} price increased by {:.2}% in the past hour. Current price: ${}",
            chain, increase_pct, current_price
        );
        self.notifier.send(&self.admin_email, &subject, &body).await;

        Ok(TrendOutcome::Notified { increase_pct })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryPriceRepository;
    use crate::testing::{ManualClock, RecordingTransport};
    use rust_decimal_macros::dec;

    const ADMIN: &str = "admin@example.com";

    struct Fixture {
        clock: Arc<ManualClock>,
        prices: Arc<InMemoryPriceRepository>,
        mail: Arc<RecordingTransport>,
        evaluator: TrendAlertEvaluator,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::fixed());
        let prices = Arc::new(InMemoryPriceRepository::new(clock.clone()));
        let mail = Arc::new(RecordingTransport::default());
        let notifier = Arc::new(Notifier::new(vec![mail.clone()]));
        let evaluator = TrendAlertEvaluator::new(
            prices.clone(),
            notifier,
            clock.clone(),
            ADMIN,
            TrendAlertConfig::default(),
        );
        Fixture { clock, prices, mail, evaluator }
    }

    #[tokio::test]
    async fn test_no_history_takes_no_action() {
        let f = fixture();

        let outcome = f.evaluator.evaluate(&Chain::new("ethereum"), dec!(5000)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::InsufficientHistory);
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_recent_samples_are_not_a_reference() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(100)).await.unwrap();
        f.clock.advance(Duration::minutes(59));

        let outcome = f.evaluator.evaluate(&chain, dec!(200)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::InsufficientHistory);
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_increase_above_threshold_notifies_admin() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(100)).await.unwrap();
        f.clock.advance(Duration::minutes(61));

        let outcome = f.evaluator.evaluate(&chain, dec!(103.5)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::Notified { increase_pct: dec!(3.50) });
        let sent = f.mail.sent_to(ADMIN);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "ethereum Price Alert: 3% Increase");
        assert_eq!(
            sent[0].body,
            "ethereum price increased by 3.50% in the past hour. Current price: $103.5"
        );
    }

    #[tokio::test]
    async fn test_exactly_threshold_does_not_notify() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(100)).await.unwrap();
        f.clock.advance(Duration::minutes(90));

        let outcome = f.evaluator.evaluate(&chain, dec!(103)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::BelowThreshold { increase_pct: dec!(3) });
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_decrease_does_not_notify() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(100)).await.unwrap();
        f.clock.advance(Duration::hours(2));

        let outcome = f.evaluator.evaluate(&chain, dec!(80)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::BelowThreshold { increase_pct: dec!(-20) });
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_compares_against_latest_sample_past_lookback() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(50)).await.unwrap();
        f.clock.advance(Duration::minutes(10));
        f.prices.save(&chain, dec!(100)).await.unwrap();
        f.clock.advance(Duration::minutes(30));
        f.prices.save(&chain, dec!(101)).await.unwrap();
        f.clock.advance(Duration::minutes(31));

        // 100 is the newest sample older than one hour; 50 is older still
        let outcome = f.evaluator.evaluate(&chain, dec!(102)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::BelowThreshold { increase_pct: dec!(2) });
    }

    #[tokio::test]
    async fn test_sustained_increase_fires_every_tick() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(100)).await.unwrap();
        f.clock.advance(Duration::minutes(61));

        f.evaluator.evaluate(&chain, dec!(110)).await.unwrap();
        f.clock.advance(Duration::minutes(1));
        f.evaluator.evaluate(&chain, dec!(110)).await.unwrap();

        assert_eq!(f.mail.sent_to(ADMIN).len(), 2);
    }

    #[tokio::test]
    async fn test_zero_reference_price_is_skipped() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(0)).await.unwrap();
        f.clock.advance(Duration::hours(2));

        let outcome = f.evaluator.evaluate(&chain, dec!(10)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::ZeroReference);
        assert!(f.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn test_tiny_reference_price_does_not_overflow() {
        let f = fixture();
        let chain = Chain::new("ethereum");
        f.prices.save(&chain, dec!(0.0000000000000000000000000001)).await.unwrap();
        f.clock.advance(Duration::hours(2));

        let outcome = f.evaluator.evaluate(&chain, dec!(1)).await.unwrap();

        assert_eq!(outcome, TrendOutcome::ZeroReference);
        assert!(f.mail.sent().is_empty());
    }
}
