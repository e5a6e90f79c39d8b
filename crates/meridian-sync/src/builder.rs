// crates/meridian-sync/src/builder.rs
//
// Snapshot Builder: turns one ledger answer into a dense snapshot.
//
// List position is the uid-index. Scores are converted from fixed point,
// dividends and last_update are copied unscaled, and each neuron's sparse
// weights and bonds become a dense row of length n.

use meridian_core::endpoint::Endpoint;
use meridian_core::error::MeridianError;
use meridian_core::neuron::{from_fixed_point, NeuronRecord};
use meridian_core::snapshot::{protocol_version, Snapshot, SnapshotParts, DEFAULT_TAU};

use crate::dense::to_dense_matrix;

/// Build a snapshot at `block` from the ledger's neuron list.
///
/// Pure function of its inputs. Nothing is published here; the caller
/// decides what to do with the result.
///
/// # Errors
/// Returns `MeridianError::Encoding` if an endpoint cannot be represented and
/// `MeridianError::IndexOutOfRange` if a weight or bond names a uid outside
/// the population.
pub fn build_snapshot(block: u64, neurons: &[NeuronRecord]) -> Result<Snapshot, MeridianError> {
    let n = neurons.len();

    let weights = to_dense_matrix(neurons.iter().map(|neuron| neuron.weights.as_slice()))?;
    let bonds = to_dense_matrix(neurons.iter().map(|neuron| neuron.bonds.as_slice()))?;

    let mut parts = SnapshotParts {
        version: protocol_version(),
        tau: DEFAULT_TAU,
        block,
        weights,
        bonds,
        ..SnapshotParts::default()
    };
    parts.uids.reserve(n);
    parts.endpoints.reserve(n);

    let mut displaced = 0usize;
    for (position, neuron) in neurons.iter().enumerate() {
        if neuron.uid != position as u64 {
            displaced += 1;
        }

        let endpoint = Endpoint::from_neuron(neuron)?;
        // Reject keys the packed row cannot hold now rather than at save time.
        endpoint.encode()?;

        parts.uids.push(neuron.uid);
        parts.active.push(neuron.active != 0);
        parts.stake.push(from_fixed_point(neuron.stake));
        parts.ranks.push(from_fixed_point(neuron.rank));
        parts.trust.push(from_fixed_point(neuron.trust));
        parts.consensus.push(from_fixed_point(neuron.consensus));
        parts.incentive.push(from_fixed_point(neuron.incentive));
        parts.inflation.push(from_fixed_point(neuron.inflation));
        parts.dividends.push(neuron.dividends);
        parts.last_update.push(neuron.last_update);
        parts.endpoints.push(endpoint);
    }

    if displaced > 0 {
        tracing::warn!(
            "{} of {} neurons report a uid different from their list position; \
             rows are indexed by position, weight columns by reported uid",
            displaced,
            n
        );
    }

    tracing::debug!("Built snapshot n={} block={}", n, block);
    Snapshot::from_parts(parts)
}
