//! Market data providers

mod moralis_client;

pub use moralis_client::MoralisMarketData;
