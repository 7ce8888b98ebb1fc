//! Periodic driver for the ingestion cycle

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use super::ingestion::IngestionCycle;

/// Runs one ingestion tick per period.
///
/// Ticks are awaited inline, so a slow tick delays the next one instead of
/// overlapping it; missed periods are skipped rather than replayed.
pub struct PriceScheduler {
    cycle: Arc<IngestionCycle>,
    period: Duration,
}

impl PriceScheduler {
    pub fn new(cycle: Arc<IngestionCycle>, period: Duration) -> Self {
        Self { cycle, period }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    /// Returns the number of ticks executed.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(
            "⏰ Price scheduler started: {} chains every {}s",
            self.cycle.chains().len(),
            self.period.as_secs()
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    ticks += 1;
                    self.cycle.run_tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("🛑 Price scheduler stopped after {} ticks", ticks);
        ticks
    }
}
