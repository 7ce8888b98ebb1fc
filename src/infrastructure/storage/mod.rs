//! Storage for price samples and alert subscriptions.
//!
//! Postgres through sea-orm when a database is configured, process memory
//! otherwise.

pub mod entities;
pub mod migration;

mod memory_alert_repository;
mod memory_price_repository;
mod postgres_alert_repository;
mod postgres_price_repository;

pub use memory_alert_repository::InMemoryAlertRepository;
pub use memory_price_repository::InMemoryPriceRepository;
pub use postgres_alert_repository::PostgresAlertRepository;
pub use postgres_price_repository::PostgresPriceRepository;

use sea_orm::{Database, DatabaseConnection, DbErr};
use tracing::info;

/// Connect and create the schema when it is missing
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(url).await?;
    migration::run_migrations(&db).await?;
    info!("🗄️ Storage connected to postgres");
    Ok(db)
}
