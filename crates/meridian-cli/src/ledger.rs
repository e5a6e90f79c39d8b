// crates/meridian-cli/src/ledger.rs
//
// Offline ledger backed by a JSON neuron dump.
//
// Dump format:
//   { "block": 1234, "neurons": [ { "uid": 0, "hotkey": "...", ... }, ... ] }
//
// The file is re-read on every query, so editing it between syncs behaves
// like a changing chain.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use meridian_core::error::MeridianError;
use meridian_core::neuron::NeuronRecord;
use meridian_core::traits::Ledger;

/// Contents of a neuron dump file.
#[derive(Debug, Deserialize)]
struct NeuronDump {
    block: u64,
    #[serde(default)]
    neurons: Vec<NeuronRecord>,
}

/// A `Ledger` that serves a neuron dump from disk.
pub struct JsonFileLedger {
    path: PathBuf,
    network: String,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>, network: &str) -> Self {
        Self {
            path: path.into(),
            network: network.to_string(),
        }
    }

    async fn read_dump(&self) -> Result<NeuronDump, MeridianError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            MeridianError::Ledger(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            MeridianError::Ledger(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl Ledger for JsonFileLedger {
    fn network(&self) -> &str {
        &self.network
    }

    async fn get_current_block(&self) -> Result<u64, MeridianError> {
        Ok(self.read_dump().await?.block)
    }

    async fn neurons(&self) -> Result<Vec<NeuronRecord>, MeridianError> {
        Ok(self.read_dump().await?.neurons)
    }
}
