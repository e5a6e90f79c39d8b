// crates/meridian-sync/src/dense.rs
//
// Sparse-to-dense conversion for weight and bond rows.
//
// The ledger reports each neuron's weights and bonds as (peer_uid, value)
// pairs. The snapshot stores them as dense rows of length n, indexed by the
// peer's reported uid, with zeros for peers that are not listed. Values are
// copied as given; rows are not renormalized.

use meridian_core::error::MeridianError;

/// Expand sparse `(peer_uid, value)` pairs into a dense row of length `n`.
///
/// Later pairs overwrite earlier ones for the same peer.
///
/// # Errors
/// Returns `MeridianError::IndexOutOfRange` if any `peer_uid >= n`, and
/// `MeridianError::NonFinite` if any value is NaN or infinite.
pub fn to_dense(n: usize, pairs: &[(u64, f64)]) -> Result<Vec<f64>, MeridianError> {
    let mut row = vec![0.0; n];
    for &(peer_uid, value) in pairs {
        let idx = usize::try_from(peer_uid)
            .ok()
            .filter(|&idx| idx < n)
            .ok_or(MeridianError::IndexOutOfRange { index: peer_uid, n })?;
        if !value.is_finite() {
            return Err(MeridianError::NonFinite {
                index: peer_uid,
                value,
            });
        }
        row[idx] = value;
    }
    Ok(row)
}

/// Expand one sparse row per neuron into an `n x n` matrix, where `n` is the
/// number of rows.
pub fn to_dense_matrix<'a, I>(rows: I) -> Result<Vec<Vec<f64>>, MeridianError>
where
    I: ExactSizeIterator<Item = &'a [(u64, f64)]>,
{
    let n = rows.len();
    rows.map(|pairs| to_dense(n, pairs)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_listed_peers_and_zeros_the_rest() {
        let row = to_dense(3, &[(0, 0.2), (2, 0.8)]).unwrap();
        assert_eq!(row, vec![0.2, 0.0, 0.8]);
    }

    #[test]
    fn empty_pairs_give_zero_row() {
        assert_eq!(to_dense(4, &[]).unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn zero_population_gives_empty_row() {
        assert!(to_dense(0, &[]).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_peer_is_rejected() {
        let err = to_dense(3, &[(5, 1.0)]).unwrap_err();
        assert!(matches!(err, MeridianError::IndexOutOfRange { index: 5, n: 3 }));
    }

    #[test]
    fn boundary_peer_is_rejected() {
        assert!(to_dense(3, &[(0, 0.5), (3, 0.5)]).is_err());
        assert!(to_dense(0, &[(0, 1.0)]).is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = to_dense(2, &[(0, 0.5), (1, value)]).unwrap_err();
            assert!(matches!(err, MeridianError::NonFinite { index: 1, .. }));
        }
    }

    #[test]
    fn duplicate_peer_keeps_last_value() {
        let row = to_dense(2, &[(1, 0.4), (1, 0.6)]).unwrap();
        assert_eq!(row, vec![0.0, 0.6]);
    }

    #[test]
    fn values_are_not_renormalized() {
        let row = to_dense(3, &[(0, 3.0), (1, 4.5)]).unwrap();
        let sum: f64 = row.iter().sum();
        assert!((sum - 7.5).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_square() {
        let sparse: Vec<Vec<(u64, f64)>> = vec![vec![(1, 0.3)], vec![], vec![(0, 0.5), (2, 0.5)]];
        let matrix = to_dense_matrix(sparse.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(matrix.len(), 3);
        assert!(matrix.iter().all(|row| row.len() == 3));
        assert_eq!(matrix[0], vec![0.0, 0.3, 0.0]);
        assert_eq!(matrix[1], vec![0.0; 3]);
        assert_eq!(matrix[2], vec![0.5, 0.0, 0.5]);
    }
}
