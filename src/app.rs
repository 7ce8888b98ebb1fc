use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{self, ApiState};
use crate::application::{IngestionCycle, PriceScheduler, PriceService, TickReport};
use crate::config::Config;
use crate::domain::alert::{AlertRepository, ThresholdAlertEvaluator, TrendAlertEvaluator};
use crate::domain::market::MarketDataSource;
use crate::domain::notify::{MailTransport, Notifier};
use crate::domain::price::{HourlyAggregator, PriceRepository};
use crate::infrastructure::storage;
use crate::infrastructure::{
    ConsoleTransport, HttpMailTransport, InMemoryAlertRepository, InMemoryPriceRepository, MoralisMarketData,
    PostgresAlertRepository, PostgresPriceRepository, SmtpMailTransport,
};
use crate::shared::types::{Clock, SystemClock};

/// Fully wired application
pub struct App {
    config: Config,
    cycle: Arc<IngestionCycle>,
    service: Arc<PriceService>,
}

impl App {
    /// Wire the production adapters from a validated config
    pub async fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let market = MoralisMarketData::new(&config.market.base_url, &config.market.api_key)
            .context("build market data client")?;
        let transports = mail_transports(&config)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let (prices, alerts): (Arc<dyn PriceRepository>, Arc<dyn AlertRepository>) =
            match config.database.connection_url()? {
                Some(url) => {
                    let db = storage::connect(&url).await.context("connect to postgres")?;
                    // Share the pool: `DatabaseConnection` is not `Clone` when sea-orm's
                    // `mock` feature is enabled (dev-dependency for tests).
                    let price_db = sea_orm::SqlxPostgresConnector::from_sqlx_postgres_pool(
                        db.get_postgres_connection_pool().clone(),
                    );
                    (
                        Arc::new(PostgresPriceRepository::new(price_db, clock.clone())),
                        Arc::new(PostgresAlertRepository::new(db)),
                    )
                }
                None => {
                    warn!("No database configured, samples and alerts are kept in memory only");
                    (
                        Arc::new(InMemoryPriceRepository::new(clock.clone())),
                        Arc::new(InMemoryAlertRepository::new()),
                    )
                }
            };

        Ok(Self::with_components(
            config,
            Arc::new(market),
            prices,
            alerts,
            transports,
            clock,
        ))
    }

    pub fn with_components(
        config: Config,
        market: Arc<dyn MarketDataSource>,
        prices: Arc<dyn PriceRepository>,
        alerts: Arc<dyn AlertRepository>,
        transports: Vec<Arc<dyn MailTransport>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let chains = config.chain_list();
        let notifier = Arc::new(Notifier::new(transports));

        let trend = TrendAlertEvaluator::new(
            prices.clone(),
            notifier.clone(),
            clock.clone(),
            config.admin_email.clone(),
            config.trend_alert(),
        );
        let threshold = ThresholdAlertEvaluator::new(alerts.clone(), notifier);
        let cycle = Arc::new(IngestionCycle::new(
            chains.clone(),
            market,
            prices.clone(),
            trend,
            threshold,
        ));

        let aggregator = HourlyAggregator::new(prices, clock.clone(), config.hourly_window());
        let service = Arc::new(PriceService::new(chains, aggregator, alerts, clock));

        Self {
            config,
            cycle,
            service,
        }
    }

    pub fn service(&self) -> Arc<PriceService> {
        Arc::clone(&self.service)
    }

    pub async fn tick_once(&self) -> TickReport {
        self.cycle.run_tick().await
    }

    /// Run the scheduler and the HTTP API until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let scheduler = PriceScheduler::new(Arc::clone(&self.cycle), self.config.tick_interval());
        let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

        let app = api::router(ApiState {
            service: self.service(),
        });
        let listener = TcpListener::bind(&self.config.server.bind)
            .await
            .with_context(|| format!("bind {}", self.config.server.bind))?;
        info!("🌐 HTTP API listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown requested");
            })
            .await?;

        let _ = shutdown_tx.send(true);
        scheduler_handle.await?;
        Ok(())
    }
}

/// SMTP and the HTTP relay when configured, the log otherwise
fn mail_transports(config: &Config) -> Result<Vec<Arc<dyn MailTransport>>> {
    let mut transports: Vec<Arc<dyn MailTransport>> = Vec::new();
    if let Some(smtp) = SmtpMailTransport::maybe_from_config(&config.mail).context("build smtp transport")? {
        info!("📧 SMTP delivery enabled");
        transports.push(Arc::new(smtp));
    }
    if let Some(relay) = HttpMailTransport::maybe_from_config(&config.mail).context("build mail relay")? {
        info!("📧 Mail relay enabled");
        transports.push(Arc::new(relay));
    }
    if transports.is_empty() {
        warn!("📧 No SMTP_HOST or MAIL_API_URL set, alerts go to the log only");
        transports.push(Arc::new(ConsoleTransport::new()));
    }
    Ok(transports)
}
