//! Error handling for the application

use thiserror::Error;

/// Market data provider errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Market data request failed: {0}")]
    Request(String),

    #[error("Market data provider returned status {0}")]
    Status(u16),

    #[error("Invalid market data payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MarketDataError::InvalidPayload(err.to_string())
        } else {
            MarketDataError::Request(err.to_string())
        }
    }
}

/// Storage errors raised by the price and alert repositories
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage rejected write: {0}")]
    WriteRejected(String),
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        RepositoryError::Unavailable(err.to_string())
    }
}

/// Mail delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Mail transport failed: {0}")]
    Transport(String),

    #[error("Mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid email message: {0}")]
    InvalidMessage(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

impl From<lettre::address::AddressError> for NotifyError {
    fn from(err: lettre::address::AddressError) -> Self {
        NotifyError::InvalidMessage(err.to_string())
    }
}

impl From<lettre::error::Error> for NotifyError {
    fn from(err: lettre::error::Error) -> Self {
        NotifyError::InvalidMessage(err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config file: {0}")]
    Parse(String),
}

/// Errors surfaced by the exposed price service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
