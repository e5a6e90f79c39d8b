// crates/meridian-cli/src/commands/sync.rs
//
// `meridian sync` — load the saved snapshot, sync it against a neuron dump,
// and save the result.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use meridian_sync::{LoadOutcome, Metagraph};

use crate::config::CliConfig;
use crate::ledger::JsonFileLedger;

/// Arguments for `meridian sync`.
#[derive(Debug, Args)]
pub struct SyncCmd {
    /// Neuron dump to sync from: `{ "block": N, "neurons": [...] }`.
    #[arg(long)]
    pub neurons: PathBuf,

    /// Do not write the synced snapshot back to disk.
    #[arg(long)]
    pub no_save: bool,
}

/// Run the sync command.
pub async fn run(cmd: &SyncCmd, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = Arc::new(JsonFileLedger::new(&cmd.neurons, &config.network));
    let metagraph = Metagraph::new(ledger)
        .with_root_dir(config.root_dir_path())
        .with_sync_timeout(config.sync_timeout());

    // An unreadable saved snapshot is replaced by this sync.
    match metagraph.load(None).await {
        Ok(LoadOutcome::Loaded(path)) => {
            let previous = metagraph.snapshot().await;
            println!("Previous: {} from {}", previous, path.display());
        }
        Ok(LoadOutcome::Missing(_)) => println!("Previous: none"),
        Err(e) => {
            tracing::warn!("Ignoring saved metagraph for {}: {}", config.network, e);
            println!("Previous: unreadable ({})", e);
        }
    }

    let snapshot = metagraph.sync().await?;
    println!("Synced:   {}", snapshot);
    println!("Active:   {} of {}", snapshot.active_uids().len(), snapshot.n());

    if !cmd.no_save {
        let path = metagraph.save(None).await?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
