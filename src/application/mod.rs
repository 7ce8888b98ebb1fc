//! Application layer - use cases and services

pub mod commands;
pub mod ingestion;
pub mod scheduler;
pub mod services;

pub use commands::{Cli, Commands};
pub use ingestion::{IngestionCycle, TickReport};
pub use scheduler::PriceScheduler;
pub use services::PriceService;
