// crates/meridian-core/src/traits.rs

use async_trait::async_trait;

use crate::error::MeridianError;
use crate::neuron::NeuronRecord;

/// Source of ledger state consumed by a sync pass.
///
/// Implementations talk to a chain node, an indexer, or an offline dump.
/// Both queries may fail and may return different answers between calls.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Name of the network this ledger serves. Used as the default snapshot
    /// file name.
    fn network(&self) -> &str;

    /// Current block height.
    async fn get_current_block(&self) -> Result<u64, MeridianError>;

    /// Every registered neuron. List position becomes the uid-index in the
    /// snapshot built from it.
    async fn neurons(&self) -> Result<Vec<NeuronRecord>, MeridianError>;
}
