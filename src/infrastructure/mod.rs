//! Infrastructure layer - adapters for market data, storage and mail

pub mod mail;
pub mod market_data;
pub mod storage;

pub use mail::{ConsoleTransport, HttpMailTransport, SmtpMailTransport};
pub use market_data::MoralisMarketData;
pub use storage::{
    InMemoryAlertRepository, InMemoryPriceRepository, PostgresAlertRepository, PostgresPriceRepository,
};
