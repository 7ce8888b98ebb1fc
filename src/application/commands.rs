//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chainwatch")]
#[command(version, about = "Chain price sampler with trend and target-price email alerts")]
pub struct Cli {
    /// Path to a TOML config file (environment variables override it)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Sample prices on a schedule and serve the HTTP API
    Run {
        /// Address for the HTTP API (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,

        /// Seconds between ingestion ticks (overrides TICK_INTERVAL_SECS)
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Run a single ingestion tick and print its report as JSON
    Tick,

    /// Validate the configuration and print the tracked chains
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::parse_from([
            "chainwatch",
            "--config",
            "chainwatch.toml",
            "run",
            "--bind",
            "127.0.0.1:8080",
            "--interval-secs",
            "30",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("chainwatch.toml")));
        assert_eq!(
            cli.command,
            Commands::Run {
                bind: Some("127.0.0.1:8080".to_string()),
                interval_secs: Some(30),
            }
        );
    }

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(Cli::parse_from(["chainwatch", "tick"]).command, Commands::Tick);
        assert_eq!(
            Cli::parse_from(["chainwatch", "check-config"]).command,
            Commands::CheckConfig
        );
    }
}
