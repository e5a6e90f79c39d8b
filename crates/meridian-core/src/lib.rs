// crates/meridian-core/src/lib.rs
//
// meridian-core: Core types, endpoint codec, and snapshot state for the
// Meridian metagraph.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the ledger input record, the packed endpoint codec, the
// immutable snapshot with its derived views, the ledger trait, and the
// shared error type.

pub mod endpoint;
pub mod error;
pub mod neuron;
pub mod snapshot;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use meridian_core::Snapshot;`

pub use endpoint::{Endpoint, PackedEndpoint, KEY_BYTES, PACKED_ENDPOINT_WORDS};
pub use error::MeridianError;
pub use neuron::{from_fixed_point, NeuronRecord, FIXED_POINT_DENOMINATOR};
pub use snapshot::{protocol_version, Snapshot, SnapshotParts, DEFAULT_TAU};
pub use traits::Ledger;
