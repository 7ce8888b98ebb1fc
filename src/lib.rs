//! Chainwatch - chain price sampler with email alerts
//!
//! Samples USD prices for a configured set of chains once per tick, keeps a
//! per-chain time series, mails the administrator on a rapid rise, mails
//! subscribers when their target price is reached, and serves an hourly
//! average view of the last day.

pub mod api;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use app::App;
pub use application::{IngestionCycle, PriceService, TickReport};
pub use config::Config;
pub use domain::alert::{ThresholdAlertEvaluator, TrendAlertEvaluator};
pub use domain::price::HourlyAggregator;
