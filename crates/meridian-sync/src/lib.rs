// crates/meridian-sync/src/lib.rs
//
// meridian-sync: Synchronization and reshaping for the Meridian metagraph.
//
// This crate turns the ledger's sparse per-neuron records into dense,
// uid-indexed snapshots and owns the current snapshot on behalf of callers:
// sync from the ledger, save and load through meridian-store.

pub mod builder;
pub mod dense;
pub mod metagraph;

pub use builder::build_snapshot;
pub use dense::{to_dense, to_dense_matrix};
pub use metagraph::{LoadOutcome, Metagraph, DEFAULT_SYNC_TIMEOUT};
