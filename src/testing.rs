//! Test doubles shared by the unit tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::market::{MarketAsset, MarketDataSource};
use crate::domain::notify::{EmailMessage, MailTransport};
use crate::shared::errors::{MarketDataError, NotifyError};
use crate::shared::types::Clock;

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// 2024-01-15 12:00:00 UTC
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Market data source returning a fixed snapshot
pub struct StaticMarketData {
    assets: Mutex<Vec<MarketAsset>>,
    calls: AtomicUsize,
}

impl StaticMarketData {
    pub fn new(assets: &[(&str, Decimal)]) -> Self {
        Self {
            assets: Mutex::new(assets.iter().map(|(name, price)| asset(name, *price)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_price(&self, name: &str, price: Decimal) {
        let mut assets = self.assets.lock().unwrap();
        match assets.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.usd_price = Some(price),
            None => assets.push(asset(name, price)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn fetch_snapshot(&self) -> Result<Vec<MarketAsset>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.assets.lock().unwrap().clone())
    }
}

/// Market data source that is always down
pub struct UnavailableMarketData;

#[async_trait]
impl MarketDataSource for UnavailableMarketData {
    async fn fetch_snapshot(&self) -> Result<Vec<MarketAsset>, MarketDataError> {
        Err(MarketDataError::Status(503))
    }
}

pub fn asset(name: &str, price: Decimal) -> MarketAsset {
    MarketAsset {
        name: name.to_string(),
        symbol: None,
        usd_price: Some(price),
    }
}

/// Transport that records every delivered message
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<EmailMessage> {
        self.sent().into_iter().filter(|m| m.to == to).collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Transport that rejects everything
pub struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn deliver(&self, _message: &EmailMessage) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}
