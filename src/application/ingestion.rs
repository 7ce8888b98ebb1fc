//! One ingestion tick: fetch, store, evaluate
//!
//! The snapshot is fetched once per tick and shared by every chain. Each
//! chain is then processed concurrently; a chain that is missing, fails to
//! persist, or panics is recorded in the report and never affects its
//! siblings.

use futures::future::join_all;
use futures::FutureExt;
use rust_decimal::Decimal;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::alert::{ThresholdAlertEvaluator, TrendAlertEvaluator, TrendOutcome};
use crate::domain::market::{find_chain_price, MarketAsset, MarketDataSource};
use crate::domain::price::PriceRepository;
use crate::shared::types::Chain;

/// Stage at which a chain's processing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Save,
    TrendCheck,
    ThresholdCheck,
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainFailure {
    pub chain: Chain,
    pub stage: FailureStage,
    pub reason: String,
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Set when the snapshot fetch failed and the whole tick was skipped
    pub fetch_error: Option<String>,
    /// Chains that got a new sample
    pub stored: Vec<Chain>,
    /// Chains absent from the snapshot
    pub missing: Vec<Chain>,
    pub failures: Vec<ChainFailure>,
    pub trend_alerts: usize,
    pub threshold_alerts: usize,
}

impl TickReport {
    fn aborted(reason: String) -> Self {
        Self {
            fetch_error: Some(reason),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
enum ChainOutcome {
    Missing,
    SaveFailed(String),
    Stored {
        trend_alert: bool,
        threshold_alerts: usize,
        failures: Vec<(FailureStage, String)>,
    },
}

pub struct IngestionCycle {
    chains: Vec<Chain>,
    market: Arc<dyn MarketDataSource>,
    prices: Arc<dyn PriceRepository>,
    trend: TrendAlertEvaluator,
    threshold: ThresholdAlertEvaluator,
}

impl IngestionCycle {
    pub fn new(
        chains: Vec<Chain>,
        market: Arc<dyn MarketDataSource>,
        prices: Arc<dyn PriceRepository>,
        trend: TrendAlertEvaluator,
        threshold: ThresholdAlertEvaluator,
    ) -> Self {
        Self {
            chains,
            market,
            prices,
            trend,
            threshold,
        }
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub async fn run_tick(&self) -> TickReport {
        let snapshot = match self.market.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Error fetching blockchain data, skipping tick: {}", e);
                return TickReport::aborted(e.to_string());
            }
        };

        let snapshot = &snapshot;
        let tasks = self.chains.iter().map(|chain| async move {
            let result = AssertUnwindSafe(self.process_chain(chain, snapshot))
                .catch_unwind()
                .await;
            (chain, result)
        });

        let mut report = TickReport::default();
        for (chain, result) in join_all(tasks).await {
            match result {
                Ok(ChainOutcome::Missing) => report.missing.push(chain.clone()),
                Ok(ChainOutcome::SaveFailed(reason)) => report.failures.push(ChainFailure {
                    chain: chain.clone(),
                    stage: FailureStage::Save,
                    reason,
                }),
                Ok(ChainOutcome::Stored {
                    trend_alert,
                    threshold_alerts,
                    failures,
                }) => {
                    report.stored.push(chain.clone());
                    report.trend_alerts += usize::from(trend_alert);
                    report.threshold_alerts += threshold_alerts;
                    report
                        .failures
                        .extend(failures.into_iter().map(|(stage, reason)| ChainFailure {
                            chain: chain.clone(),
                            stage,
                            reason,
                        }));
                }
                Err(_) => {
                    error!("Processing for chain {} panicked", chain);
                    report.failures.push(ChainFailure {
                        chain: chain.clone(),
                        stage: FailureStage::Panic,
                        reason: "chain processing panicked".to_string(),
                    });
                }
            }
        }

        info!(
            "Prices fetched and processed: {} stored, {} missing, {} failures, {} trend alerts, {} target alerts",
            report.stored.len(),
            report.missing.len(),
            report.failures.len(),
            report.trend_alerts,
            report.threshold_alerts
        );
        report
    }

    async fn process_chain(&self, chain: &Chain, snapshot: &[MarketAsset]) -> ChainOutcome {
        let Some(price) = find_chain_price(snapshot, chain) else {
            warn!("Data for chain '{}' not found.", chain);
            return ChainOutcome::Missing;
        };

        if let Err(e) = self.prices.save(chain, price).await {
            error!("Error saving price for chain {}: {}", chain, e);
            return ChainOutcome::SaveFailed(e.to_string());
        }
        info!("Saved {} price: {}", chain, price);

        self.evaluate(chain, price).await
    }

    async fn evaluate(&self, chain: &Chain, price: Decimal) -> ChainOutcome {
        let (trend, threshold) = tokio::join!(
            self.trend.evaluate(chain, price),
            self.threshold.evaluate(chain, price)
        );

        let mut failures = Vec::new();
        let trend_alert = match trend {
            Ok(outcome) => matches!(outcome, TrendOutcome::Notified { .. }),
            Err(e) => {
                error!("Error checking price increase for chain {}: {}", chain, e);
                failures.push((FailureStage::TrendCheck, e.to_string()));
                false
            }
        };
        let threshold_alerts = match threshold {
            Ok(count) => count,
            Err(e) => {
                error!("Error checking price alerts for chain {}: {}", chain, e);
                failures.push((FailureStage::ThresholdCheck, e.to_string()));
                0
            }
        };

        ChainOutcome::Stored {
            trend_alert,
            threshold_alerts,
            failures,
        }
    }
}
