// crates/meridian-core/src/neuron.rs

use serde::{Deserialize, Serialize};

/// Denominator of the ledger's fixed-point score encoding.
///
/// Stake, rank, trust, consensus, incentive, and inflation arrive as integers
/// scaled by this value.
pub const FIXED_POINT_DENOMINATOR: u64 = 1_000_000_000;

/// A single neuron as reported by the ledger.
///
/// Read-only input to the snapshot builder. Weights and bonds are sparse:
/// each entry is `(peer_uid, value)` and peers not listed are implicitly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronRecord {
    /// Ledger-assigned unique id.
    pub uid: u64,
    /// Identity (hot) key.
    pub hotkey: String,
    /// Address family tag: 4 or 6.
    pub ip_type: u8,
    /// Textual IP address.
    pub ip: String,
    pub port: u16,
    /// Modality tag served by this neuron.
    pub modality: u8,
    /// Owner (cold) key.
    pub coldkey: String,
    /// Fixed-point stake.
    pub stake: u64,
    pub rank: u64,
    pub trust: u64,
    pub consensus: u64,
    pub incentive: u64,
    pub inflation: u64,
    /// Dividends, copied into the snapshot unscaled.
    pub dividends: u64,
    /// Block of the neuron's last weight update.
    pub last_update: u64,
    /// 1 if active, 0 otherwise.
    pub active: u8,
    #[serde(default)]
    pub weights: Vec<(u64, f64)>,
    #[serde(default)]
    pub bonds: Vec<(u64, f64)>,
}

/// Convert a fixed-point ledger integer to a float.
pub fn from_fixed_point(raw: u64) -> f64 {
    raw as f64 / FIXED_POINT_DENOMINATOR as f64
}
