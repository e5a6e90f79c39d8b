// crates/meridian-cli/src/main.rs
//
// CLI entrypoint for the Meridian metagraph tools.
//
// Loads configuration, initializes tracing, and dispatches to the sync and
// show subcommands.

mod commands;
mod config;
mod ledger;

use clap::{Parser, Subcommand};
use commands::show::ShowCmd;
use commands::sync::SyncCmd;
use config::CliConfig;

/// Meridian CLI — keep a local copy of the network metagraph.
#[derive(Parser, Debug)]
#[command(
    name = "meridian",
    version = "0.1.0",
    about = "Meridian CLI: sync, persist, and inspect metagraph snapshots"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.meridian/config.toml")]
    config: String,

    /// Network name. Overrides the value from the config file.
    #[arg(long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Sync the metagraph from a neuron dump and save it.
    Sync(SyncCmd),

    /// Display the saved metagraph.
    Show(ShowCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The log level comes from the config, so read it before tracing is up
    // and report the outcome afterwards.
    let loaded = CliConfig::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => CliConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match loaded {
        Ok(_) => tracing::debug!("Loaded configuration from {}", cli.config),
        Err(e) => tracing::debug!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }

    if let Some(network) = &cli.network {
        config.network = network.clone();
    }
    tracing::debug!("Network: {}", config.network);

    match &cli.command {
        Commands::Sync(cmd) => commands::sync::run(cmd, &config).await?,
        Commands::Show(cmd) => commands::show::run(cmd, &config).await?,
    }

    Ok(())
}
