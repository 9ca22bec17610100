//! CLI interface for hardrock-ev
//!
//! Provides subcommands for:
//! - `run`: Poll on the configured cadence until Ctrl-C
//! - `once`: Run a single cycle
//! - `config`: Show the effective configuration

mod once;
mod run;

pub use once::OnceArgs;
pub use run::RunArgs;

use crate::config::Config;
use crate::feed::{HardRockFeed, OddsApiClient, PinnacleReference};
use crate::notify::{ConsoleNotifier, DiscordNotifier, Notifier};
use crate::risk::KellyCalculator;
use crate::scheduler::{Poller, PollerOptions};
use crate::signal::SignalEngine;
use crate::store::{SignalStore, SqliteSignalStore};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "hardrock-ev")]
#[command(about = "Positive-EV NFL signals for Hard Rock against a de-vigged Pinnacle reference")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll continuously
    Run(RunArgs),
    /// Run one polling cycle
    Once(OnceArgs),
    /// Show configuration
    Config,
}

/// Wire feeds, engine, store and notifier from configuration
///
/// A dry run keeps signals in memory and prints notifications instead of
/// posting them.
pub fn build_poller(config: &Config, options: PollerOptions, dry_run: bool) -> anyhow::Result<Poller> {
    let client = OddsApiClient::new(config.odds_api())?;
    let odds = HardRockFeed::new(client.clone(), &config.feed.bookmaker, config.feed.days_from);
    let reference = PinnacleReference::new(client, &config.reference.bookmaker, &config.reference.markets);

    let engine = SignalEngine::new(config.engine(), config.kelly());

    let store: Arc<dyn SignalStore>;
    let notifier: Arc<dyn Notifier>;
    if dry_run {
        store = Arc::new(SqliteSignalStore::open_in_memory()?);
        notifier = Arc::new(ConsoleNotifier);
    } else {
        let discord = DiscordNotifier::new(
            config.notify.webhook_url.clone(),
            Duration::from_secs(config.notify.timeout_secs),
        )?;
        if !discord.is_configured() {
            tracing::warn!("No Discord webhook configured, alerts will only be stored");
        }
        store = Arc::new(SqliteSignalStore::open(&config.store.path)?);
        notifier = Arc::new(discord);
    }

    Ok(Poller::new(
        Arc::new(odds),
        Arc::new(reference),
        engine,
        store,
        notifier,
        options,
    ))
}

/// Kelly settings in effect, for display
pub fn describe_sizing(kelly: &KellyCalculator) -> String {
    format!(
        "Kelly weight {}, max unit {}% of bankroll",
        kelly.fraction,
        kelly.max_bet_pct * rust_decimal_macros::dec!(100)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_once_flags() {
        let cli = Cli::try_parse_from(["hardrock-ev", "-c", "x.toml", "once", "--notify-empty", "--dry-run"]).unwrap();
        assert_eq!(cli.config, "x.toml");
        match cli.command {
            Commands::Once(args) => {
                assert!(args.notify_empty);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_run_and_config() {
        let cli = Cli::try_parse_from(["hardrock-ev", "run"]).unwrap();
        assert_eq!(cli.config, "config.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
        assert!(matches!(
            Cli::try_parse_from(["hardrock-ev", "config"]).unwrap().command,
            Commands::Config
        ));
    }

    #[test]
    fn test_describe_sizing() {
        let text = describe_sizing(&KellyCalculator::default());
        assert_eq!(text, "Kelly weight 0.5, max unit 2.00% of bankroll");
    }

    #[test]
    fn test_dry_run_poller_builds() {
        assert!(build_poller(&Config::default(), PollerOptions::default(), true).is_ok());
    }
}
