use anyhow::Result;
use chainwatch::application::{Cli, Commands};
use chainwatch::{App, Config};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { bind, interval_secs } => {
            // CLI has the highest priority
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(secs) = interval_secs {
                config.tick_interval_secs = secs;
            }
            App::from_config(config).await?.run().await
        }
        Commands::Tick => {
            let app = App::from_config(config).await?;
            let report = app.tick_once().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!("✅ Configuration OK");
            for chain in config.chain_list() {
                println!("  - {chain}");
            }
            println!(
                "Tick every {}s, trend alert above {}% over {} min",
                config.tick_interval_secs,
                config.alerts.trend_threshold_pct.normalize(),
                config.alerts.trend_lookback_minutes
            );
            let storage = match config.database.connection_url()? {
                Some(_) => "postgres",
                None => "in-memory",
            };
            let smtp = config.mail.smtp.host.as_deref().unwrap_or("disabled");
            println!("Storage: {storage}, SMTP: {smtp}");
            Ok(())
        }
    }
}
