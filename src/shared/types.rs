//! Common types used across the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain identifier used as the partition key for prices and alerts.
///
/// Names are trimmed and lowercased on construction, so `"Ethereum "` and
/// `"ethereum"` address the same partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Chain(String);

impl Chain {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison against a provider asset name.
    pub fn matches(&self, name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(&self.0)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Chain {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Chain {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.0
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
