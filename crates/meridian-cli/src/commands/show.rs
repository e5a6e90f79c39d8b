// crates/meridian-cli/src/commands/show.rs
//
// `meridian show` — display a saved metagraph snapshot.

use std::path::PathBuf;

use clap::Args;
use tabled::{Table, Tabled};

use meridian_core::error::MeridianError;
use meridian_core::snapshot::Snapshot;
use meridian_store::{load_from_path, serialize, snapshot_path};

use crate::config::CliConfig;

/// Arguments for `meridian show`.
#[derive(Debug, Args)]
pub struct ShowCmd {
    /// Read this snapshot file instead of `<root_dir>/<network>.json`.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Print the raw bundle as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// A row in the metagraph display table.
#[derive(Tabled)]
struct MetagraphRow {
    #[tabled(rename = "UID")]
    uid: u64,
    #[tabled(rename = "Hotkey")]
    hotkey: String,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "Trust")]
    trust: String,
    #[tabled(rename = "Consensus")]
    consensus: String,
    #[tabled(rename = "Incentive")]
    incentive: String,
    #[tabled(rename = "Dividends")]
    dividends: u64,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Address")]
    address: String,
}

fn metagraph_rows(snapshot: &Snapshot) -> Vec<MetagraphRow> {
    (0..snapshot.n())
        .map(|i| MetagraphRow {
            uid: snapshot.uids()[i],
            hotkey: short_key(&snapshot.hotkeys()[i]),
            stake: format!("{:.4}", snapshot.stake()[i]),
            rank: format!("{:.3}", snapshot.ranks()[i]),
            trust: format!("{:.3}", snapshot.trust()[i]),
            consensus: format!("{:.3}", snapshot.consensus()[i]),
            incentive: format!("{:.3}", snapshot.incentive()[i]),
            dividends: snapshot.dividends()[i],
            active: if snapshot.active()[i] { "yes" } else { "--" }.to_string(),
            address: snapshot.addresses()[i].clone(),
        })
        .collect()
}

/// The metagraph as a table, headed by the snapshot summary line.
fn render_table(snapshot: &Snapshot) -> String {
    format!(
        "{}  |  Total stake: {:.4}\n\n{}",
        snapshot,
        snapshot.total_stake(),
        Table::new(metagraph_rows(snapshot))
    )
}

/// The persisted bundle, pretty-printed.
fn render_bundle(snapshot: &Snapshot) -> Result<String, MeridianError> {
    let bundle: serde_json::Value = serde_json::from_slice(&serialize(snapshot)?)?;
    serde_json::to_string_pretty(&bundle).map_err(|e| MeridianError::Serialization(e.to_string()))
}

/// Keep the first 12 characters of long keys.
fn short_key(key: &str) -> String {
    match key.char_indices().nth(12) {
        Some((cut, _)) => format!("{}…", &key[..cut]),
        None => key.to_string(),
    }
}

/// Run the show command.
pub async fn run(cmd: &ShowCmd, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = match &cmd.path {
        Some(path) => path.clone(),
        None => snapshot_path(&config.root_dir_path(), &config.network)?,
    };

    let snapshot = match load_from_path(&path) {
        Ok(snapshot) => snapshot,
        Err(MeridianError::NotFound(_)) => {
            println!(
                "No snapshot at {}. Run `meridian sync` first.",
                path.display()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if cmd.json {
        println!("{}", render_bundle(&snapshot)?);
    } else {
        println!("{}", render_table(&snapshot));
    }

    Ok(())
}
