use rust_decimal::Decimal;
use serde::Deserialize;
use std::{env, fs, path::Path, time::Duration};

use crate::domain::alert::TrendAlertConfig;
use crate::shared::errors::ConfigError;
use crate::shared::types::Chain;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://deep-index.moralis.io/api/v2.2".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP relay; SMTP delivery is off when unset
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS from the first byte (usually port 465). Otherwise the
    /// connection is upgraded with STARTTLS when the server offers it.
    pub secure: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            user: None,
            password: None,
            secure: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp: SmtpConfig,
    /// Transactional-mail HTTP endpoint, optional
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_email: String,
}

impl MailConfig {
    pub fn sender(&self) -> String {
        format!("\"No Reply\" <{}>", self.from_email)
    }
}

/// Postgres connection settings. Samples and subscriptions are kept in
/// process memory when none are given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection string, wins over the discrete fields
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl DatabaseConfig {
    /// `None` when no database is configured
    pub fn connection_url(&self) -> Result<Option<String>, ConfigError> {
        if let Some(url) = non_blank(&self.url) {
            return Ok(Some(url.to_string()));
        }
        let Some(host) = non_blank(&self.host) else {
            return Ok(None);
        };

        let invalid = |reason: String| ConfigError::Invalid {
            key: "DATABASE_HOST",
            reason,
        };
        let mut url = reqwest::Url::parse(&format!("postgres://{}:{}", host, self.port.unwrap_or(5432)))
            .map_err(|e| invalid(e.to_string()))?;
        if let Some(user) = non_blank(&self.user) {
            url.set_username(user)
                .map_err(|_| invalid("URL cannot carry a user name".to_string()))?;
        }
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password))
                .map_err(|_| invalid("URL cannot carry a password".to_string()))?;
        }
        if let Some(name) = non_blank(&self.name) {
            url.set_path(&format!("/{name}"));
        }
        Ok(Some(url.to_string()))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub trend_threshold_pct: Decimal,
    pub trend_lookback_minutes: i64,
    pub hourly_window_hours: i64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            trend_threshold_pct: Decimal::new(3, 0),
            trend_lookback_minutes: 60,
            hourly_window_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chains: Vec<String>,
    pub admin_email: String,
    pub tick_interval_secs: u64,
    pub market: MarketConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub alerts: AlertsConfig,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            admin_email: String::new(),
            tick_interval_secs: 60,
            market: MarketConfig::default(),
            database: DatabaseConfig::default(),
            mail: MailConfig::default(),
            alerts: AlertsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults, then the optional TOML file, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    /// Overlay values found through `lookup`; unset keys keep their current value
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CHAINS") {
            self.chains = parse_chain_list(&raw);
        }
        if let Some(v) = lookup("ADMIN_EMAIL") {
            self.admin_email = v.trim().to_string();
        }
        if let Some(v) = lookup("MORALIS_API_KEY") {
            self.market.api_key = v;
        }
        if let Some(v) = lookup("MORALIS_BASE_URL") {
            self.market.base_url = v;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_HOST") {
            self.database.host = Some(v);
        }
        if let Some(v) = lookup("DATABASE_PORT") {
            self.database.port = Some(parse_env("DATABASE_PORT", &v)?);
        }
        if let Some(v) = lookup("DATABASE_USER") {
            self.database.user = Some(v);
        }
        if let Some(v) = lookup("DATABASE_PASSWORD") {
            self.database.password = Some(v);
        }
        if let Some(v) = lookup("DATABASE_NAME") {
            self.database.name = Some(v);
        }
        if let Some(v) = lookup("SMTP_HOST") {
            self.mail.smtp.host = Some(v);
        }
        if let Some(v) = lookup("SMTP_PORT") {
            self.mail.smtp.port = parse_env("SMTP_PORT", &v)?;
        }
        if let Some(v) = lookup("SMTP_USER") {
            self.mail.smtp.user = Some(v);
        }
        if let Some(v) = lookup("SMTP_PASSWORD") {
            self.mail.smtp.password = Some(v);
        }
        if let Some(v) = lookup("SMTP_SECURE") {
            self.mail.smtp.secure = parse_env("SMTP_SECURE", &v)?;
        }
        if let Some(v) = lookup("MAIL_API_URL") {
            self.mail.api_url = Some(v);
        }
        if let Some(v) = lookup("MAIL_API_KEY") {
            self.mail.api_key = Some(v);
        }
        if let Some(v) = lookup("FROM_EMAIL") {
            self.mail.from_email = v.trim().to_string();
        }
        if let Some(v) = lookup("BIND_ADDR") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("TICK_INTERVAL_SECS") {
            self.tick_interval_secs = parse_env("TICK_INTERVAL_SECS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_list().is_empty() {
            return Err(ConfigError::Missing("CHAINS"));
        }
        if self.admin_email.is_empty() {
            return Err(ConfigError::Missing("ADMIN_EMAIL"));
        }
        if self.market.api_key.is_empty() {
            return Err(ConfigError::Missing("MORALIS_API_KEY"));
        }
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "tick_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.alerts.trend_threshold_pct.is_sign_negative() {
            return Err(ConfigError::Invalid {
                key: "alerts.trend_threshold_pct",
                reason: "must not be negative".to_string(),
            });
        }
        self.database.connection_url()?;
        if self.alerts.trend_lookback_minutes <= 0 || self.alerts.hourly_window_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "alerts",
                reason: "lookback and window must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Configured chains, normalized, in configured order without duplicates
    pub fn chain_list(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = Vec::new();
        for chain in self.chains.iter().map(Chain::new) {
            if !chain.is_empty() && !chains.contains(&chain) {
                chains.push(chain);
            }
        }
        chains
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn trend_alert(&self) -> TrendAlertConfig {
        TrendAlertConfig {
            threshold_pct: self.alerts.trend_threshold_pct,
            lookback: chrono::Duration::minutes(self.alerts.trend_lookback_minutes),
        }
    }

    pub fn hourly_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.alerts.hourly_window_hours)
    }
}

fn parse_env<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

pub fn parse_chain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
