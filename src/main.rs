use clap::Parser;
use hardrock_ev::cli::{describe_sizing, Cli, Commands};
use hardrock_ev::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using bundled default configuration");
        let mut config = Config::from_toml(include_str!("../config.toml.example"))?;
        config.apply_env(|key| std::env::var(key).ok());
        anyhow::Ok(config)
    })?;

    // Initialize telemetry
    hardrock_ev::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting continuous polling");
            args.execute(&config).await?;
        }
        Commands::Once(args) => {
            tracing::info!("Running a single cycle");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Book: {} vs reference {} ({})",
                config.feed.bookmaker, config.reference.bookmaker, config.reference.markets
            );
            println!("  Bankroll: ${}", config.risk.bankroll);
            println!("  Sizing: {}", describe_sizing(&config.kelly()));
            println!();
            print!("{}", toml::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}
