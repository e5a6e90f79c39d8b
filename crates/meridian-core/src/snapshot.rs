// crates/meridian-core/src/snapshot.rs
//
// The metagraph snapshot: dense, uid-ordered state of the network at one
// block height.
//
// A Snapshot is immutable once built. Sync and load publish a new Snapshot
// instead of editing the current one, so the lazily derived endpoint views
// live in a OnceLock owned by the instance and are dropped with it.

use std::fmt;
use std::sync::OnceLock;

use crate::endpoint::Endpoint;
use crate::error::MeridianError;

/// Global per-block inflation rate carried by every snapshot.
pub const DEFAULT_TAU: f64 = 0.5;

/// Crate version folded into a single integer: `100*major + 10*minor + patch`.
pub fn protocol_version() -> u64 {
    let part = |s: &str| s.parse::<u64>().unwrap_or(0);
    100 * part(env!("CARGO_PKG_VERSION_MAJOR"))
        + 10 * part(env!("CARGO_PKG_VERSION_MINOR"))
        + part(env!("CARGO_PKG_VERSION_PATCH"))
}

/// The raw fields of a snapshot, before invariants are checked.
///
/// Population size is the length of `uids`; every other per-uid field must
/// match it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotParts {
    pub version: u64,
    pub tau: f64,
    pub block: u64,
    pub uids: Vec<u64>,
    pub active: Vec<bool>,
    pub stake: Vec<f64>,
    pub ranks: Vec<f64>,
    pub trust: Vec<f64>,
    pub consensus: Vec<f64>,
    pub incentive: Vec<f64>,
    pub inflation: Vec<f64>,
    pub dividends: Vec<u64>,
    pub last_update: Vec<u64>,
    pub weights: Vec<Vec<f64>>,
    pub bonds: Vec<Vec<f64>>,
    pub endpoints: Vec<Endpoint>,
}

/// Projections of the endpoint list, computed on first access.
#[derive(Debug, Clone)]
struct DerivedViews {
    hotkeys: Vec<String>,
    coldkeys: Vec<String>,
    modalities: Vec<u8>,
    addresses: Vec<String>,
}

impl DerivedViews {
    fn from_endpoints(endpoints: &[Endpoint]) -> Self {
        Self {
            hotkeys: endpoints.iter().map(|e| e.hotkey.clone()).collect(),
            coldkeys: endpoints.iter().map(|e| e.coldkey.clone()).collect(),
            modalities: endpoints.iter().map(|e| e.modality).collect(),
            addresses: endpoints.iter().map(Endpoint::address).collect(),
        }
    }
}

/// Dense network state at one block height.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    n: usize,
    tau: f64,
    block: u64,
    uids: Vec<u64>,
    active: Vec<bool>,
    stake: Vec<f64>,
    ranks: Vec<f64>,
    trust: Vec<f64>,
    consensus: Vec<f64>,
    incentive: Vec<f64>,
    inflation: Vec<f64>,
    dividends: Vec<u64>,
    last_update: Vec<u64>,
    weights: Vec<Vec<f64>>,
    bonds: Vec<Vec<f64>>,
    endpoints: Vec<Endpoint>,
    views: OnceLock<DerivedViews>,
}

impl Snapshot {
    /// The cleared state: no neurons, block 0.
    pub fn empty() -> Self {
        Self {
            version: protocol_version(),
            n: 0,
            tau: DEFAULT_TAU,
            block: 0,
            uids: Vec::new(),
            active: Vec::new(),
            stake: Vec::new(),
            ranks: Vec::new(),
            trust: Vec::new(),
            consensus: Vec::new(),
            incentive: Vec::new(),
            inflation: Vec::new(),
            dividends: Vec::new(),
            last_update: Vec::new(),
            weights: Vec::new(),
            bonds: Vec::new(),
            endpoints: Vec::new(),
            views: OnceLock::new(),
        }
    }

    /// Assemble a snapshot, checking that every per-uid vector has `n`
    /// entries and both matrices are `n x n`.
    ///
    /// # Errors
    /// Returns `MeridianError::InvalidState` naming the first field whose
    /// shape is wrong.
    pub fn from_parts(parts: SnapshotParts) -> Result<Self, MeridianError> {
        let n = parts.uids.len();

        check_len("active", parts.active.len(), n)?;
        check_len("stake", parts.stake.len(), n)?;
        check_len("ranks", parts.ranks.len(), n)?;
        check_len("trust", parts.trust.len(), n)?;
        check_len("consensus", parts.consensus.len(), n)?;
        check_len("incentive", parts.incentive.len(), n)?;
        check_len("inflation", parts.inflation.len(), n)?;
        check_len("dividends", parts.dividends.len(), n)?;
        check_len("last_update", parts.last_update.len(), n)?;
        check_len("endpoints", parts.endpoints.len(), n)?;
        check_square("weights", &parts.weights, n)?;
        check_square("bonds", &parts.bonds, n)?;

        Ok(Self {
            version: parts.version,
            n,
            tau: parts.tau,
            block: parts.block,
            uids: parts.uids,
            active: parts.active,
            stake: parts.stake,
            ranks: parts.ranks,
            trust: parts.trust,
            consensus: parts.consensus,
            incentive: parts.incentive,
            inflation: parts.inflation,
            dividends: parts.dividends,
            last_update: parts.last_update,
            weights: parts.weights,
            bonds: parts.bonds,
            endpoints: parts.endpoints,
            views: OnceLock::new(),
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Population size.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Block height this snapshot was taken at.
    pub fn block(&self) -> u64 {
        self.block
    }

    pub fn uids(&self) -> &[u64] {
        &self.uids
    }

    pub fn active(&self) -> &[bool] {
        &self.active
    }

    pub fn stake(&self) -> &[f64] {
        &self.stake
    }

    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    pub fn trust(&self) -> &[f64] {
        &self.trust
    }

    pub fn consensus(&self) -> &[f64] {
        &self.consensus
    }

    pub fn incentive(&self) -> &[f64] {
        &self.incentive
    }

    pub fn inflation(&self) -> &[f64] {
        &self.inflation
    }

    pub fn dividends(&self) -> &[u64] {
        &self.dividends
    }

    pub fn last_update(&self) -> &[u64] {
        &self.last_update
    }

    /// Weight matrix: row i is neuron i's weight toward every uid.
    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Bond matrix, same shape as the weights.
    pub fn bonds(&self) -> &[Vec<f64>] {
        &self.bonds
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    // === Short aliases ===

    /// Stake (S).
    pub fn s(&self) -> &[f64] {
        &self.stake
    }

    /// Ranks (R).
    pub fn r(&self) -> &[f64] {
        &self.ranks
    }

    /// Incentive (I).
    pub fn i(&self) -> &[f64] {
        &self.incentive
    }

    /// Consensus (C).
    pub fn c(&self) -> &[f64] {
        &self.consensus
    }

    /// Trust (T).
    pub fn t(&self) -> &[f64] {
        &self.trust
    }

    /// Dividends (D).
    pub fn d(&self) -> &[u64] {
        &self.dividends
    }

    /// Bonds (B).
    pub fn b(&self) -> &[Vec<f64>] {
        &self.bonds
    }

    /// Weights (W).
    pub fn w(&self) -> &[Vec<f64>] {
        &self.weights
    }

    // === Derived views ===

    fn views(&self) -> &DerivedViews {
        self.views
            .get_or_init(|| DerivedViews::from_endpoints(&self.endpoints))
    }

    /// Hotkey of each neuron, uid-ordered.
    pub fn hotkeys(&self) -> &[String] {
        &self.views().hotkeys
    }

    /// Coldkey of each neuron, uid-ordered.
    pub fn coldkeys(&self) -> &[String] {
        &self.views().coldkeys
    }

    pub fn modalities(&self) -> &[u8] {
        &self.views().modalities
    }

    /// `/ipv{family}/{ip}:{port}` address of each neuron.
    pub fn addresses(&self) -> &[String] {
        &self.views().addresses
    }

    // === Lookups ===

    /// Position of the neuron holding `hotkey`, if registered.
    pub fn uid_for_hotkey(&self, hotkey: &str) -> Option<usize> {
        self.hotkeys().iter().position(|h| h == hotkey)
    }

    /// Sum of all stake.
    pub fn total_stake(&self) -> f64 {
        self.stake.iter().sum()
    }

    /// Positions of all active neurons.
    pub fn active_uids(&self) -> Vec<usize> {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, &active)| active)
            .map(|(idx, _)| idx)
            .collect()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// Derived views are excluded: two snapshots with the same fields are equal
// whether or not their caches have been filled.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.n == other.n
            && self.tau == other.tau
            && self.block == other.block
            && self.uids == other.uids
            && self.active == other.active
            && self.stake == other.stake
            && self.ranks == other.ranks
            && self.trust == other.trust
            && self.consensus == other.consensus
            && self.incentive == other.incentive
            && self.inflation == other.inflation
            && self.dividends == other.dividends
            && self.last_update == other.last_update
            && self.weights == other.weights
            && self.bonds == other.bonds
            && self.endpoints == other.endpoints
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metagraph(n={}, block={})", self.n, self.block)
    }
}

fn check_len(field: &str, len: usize, n: usize) -> Result<(), MeridianError> {
    if len != n {
        return Err(MeridianError::InvalidState(format!(
            "{} has {} entries, population size is {}",
            field, len, n
        )));
    }
    Ok(())
}

fn check_square(field: &str, rows: &[Vec<f64>], n: usize) -> Result<(), MeridianError> {
    check_len(field, rows.len(), n)?;
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n {
            return Err(MeridianError::InvalidState(format!(
                "{} row {} has {} columns, population size is {}",
                field,
                i,
                row.len(),
                n
            )));
        }
    }
    Ok(())
}
