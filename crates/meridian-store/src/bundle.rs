// crates/meridian-store/src/bundle.rs
//
// Keyed bundle codec for snapshots.
//
// A bundle is a JSON object with one key per snapshot field. Endpoints are
// stored as packed integer rows. Derived views are never written; they are
// rebuilt on demand after load.

use serde::{Deserialize, Serialize};

use meridian_core::endpoint::{Endpoint, PackedEndpoint};
use meridian_core::error::MeridianError;
use meridian_core::snapshot::{Snapshot, SnapshotParts};

/// Borrowed view of a snapshot, written on save.
#[derive(Serialize)]
struct BundleRef<'a> {
    version: u64,
    n: u64,
    tau: f64,
    block: u64,
    uids: &'a [u64],
    active: &'a [bool],
    stake: &'a [f64],
    ranks: &'a [f64],
    trust: &'a [f64],
    consensus: &'a [f64],
    incentive: &'a [f64],
    inflation: &'a [f64],
    dividends: &'a [u64],
    last_update: &'a [u64],
    weights: &'a [Vec<f64>],
    bonds: &'a [Vec<f64>],
    endpoints: Vec<PackedEndpoint>,
}

/// Owned bundle, read on load.
#[derive(Deserialize)]
struct SnapshotBundle {
    version: u64,
    n: u64,
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
    endpoints: Vec<PackedEndpoint>,
}

/// Encode a snapshot as a keyed JSON bundle.
///
/// # Errors
/// Returns `MeridianError::Encoding` if an endpoint cannot be packed, or
/// `MeridianError::Serialization` if a float field holds NaN or infinity
/// (JSON would store it as `null`) or if JSON encoding fails.
pub fn serialize(snapshot: &Snapshot) -> Result<Vec<u8>, MeridianError> {
    check_finite(snapshot)?;

    let endpoints = snapshot
        .endpoints()
        .iter()
        .map(Endpoint::encode)
        .collect::<Result<Vec<_>, _>>()?;

    let bundle = BundleRef {
        version: snapshot.version(),
        n: snapshot.n() as u64,
        tau: snapshot.tau(),
        block: snapshot.block(),
        uids: snapshot.uids(),
        active: snapshot.active(),
        stake: snapshot.stake(),
        ranks: snapshot.ranks(),
        trust: snapshot.trust(),
        consensus: snapshot.consensus(),
        incentive: snapshot.incentive(),
        inflation: snapshot.inflation(),
        dividends: snapshot.dividends(),
        last_update: snapshot.last_update(),
        weights: snapshot.weights(),
        bonds: snapshot.bonds(),
        endpoints,
    };

    serde_json::to_vec(&bundle).map_err(|e| MeridianError::Serialization(e.to_string()))
}

fn check_finite(snapshot: &Snapshot) -> Result<(), MeridianError> {
    let non_finite = |field: &str| {
        MeridianError::Serialization(format!("{} holds a non-finite value", field))
    };

    if !snapshot.tau().is_finite() {
        return Err(non_finite("tau"));
    }
    let vectors = [
        ("stake", snapshot.stake()),
        ("ranks", snapshot.ranks()),
        ("trust", snapshot.trust()),
        ("consensus", snapshot.consensus()),
        ("incentive", snapshot.incentive()),
        ("inflation", snapshot.inflation()),
    ];
    for (field, values) in vectors {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(non_finite(field));
        }
    }
    for (field, matrix) in [("weights", snapshot.weights()), ("bonds", snapshot.bonds())] {
        if matrix.iter().flatten().any(|v| !v.is_finite()) {
            return Err(non_finite(field));
        }
    }
    Ok(())
}

/// Decode a bundle produced by [`serialize`].
///
/// # Errors
/// Returns `MeridianError::Deserialization` if the bytes are not a bundle,
/// an endpoint row does not decode, or the field shapes disagree with `n`.
pub fn deserialize(bytes: &[u8]) -> Result<Snapshot, MeridianError> {
    let bundle: SnapshotBundle = serde_json::from_slice(bytes)?;

    if bundle.n != bundle.uids.len() as u64 {
        return Err(MeridianError::Deserialization(format!(
            "bundle declares n = {} but holds {} uids",
            bundle.n,
            bundle.uids.len()
        )));
    }

    let endpoints = bundle
        .endpoints
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Endpoint::decode(row).map_err(|e| {
                MeridianError::Deserialization(format!("endpoint row {}: {}", i, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let parts = SnapshotParts {
        version: bundle.version,
        tau: bundle.tau,
        block: bundle.block,
        uids: bundle.uids,
        active: bundle.active,
        stake: bundle.stake,
        ranks: bundle.ranks,
        trust: bundle.trust,
        consensus: bundle.consensus,
        incentive: bundle.incentive,
        inflation: bundle.inflation,
        dividends: bundle.dividends,
        last_update: bundle.last_update,
        weights: bundle.weights,
        bonds: bundle.bonds,
        endpoints,
    };

    Snapshot::from_parts(parts).map_err(|e| MeridianError::Deserialization(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use meridian_core::snapshot::{protocol_version, DEFAULT_TAU};

    pub(crate) fn sample_snapshot() -> Snapshot {
        let endpoints = vec![
            Endpoint {
                uid: 0,
                hotkey: "5C4hrfjw9DjXZTzV3MwzrrAr9P1MJhSrvWGWqi1eSuyUpnhM".to_string(),
                ip_type: 4,
                ip: "203.0.113.9".parse().unwrap(),
                port: 8091,
                modality: 0,
                coldkey: "5DAAnrj7VHTznn2AWBemMuyBwZWs6FNFjdyVXUeYum3PTXFy".to_string(),
            },
            Endpoint {
                uid: 1,
                hotkey: "5HGjWAeFDfFCWPsjFQdVV2Msvz2XtMktvgocEZcCj68kUMaw".to_string(),
                ip_type: 6,
                ip: "2001:db8::1".parse().unwrap(),
                port: 30333,
                modality: 2,
                coldkey: "5CiPPseXPECbkjWCa6MnjNokrgYjMqmKndv2rSnekmSK2DjL".to_string(),
            },
            Endpoint {
                uid: 2,
                hotkey: "5FLSigC9HGRKVhB9FiEo4Y3koPsNmBmLJbpXg2mp1hXcS59Y".to_string(),
                ip_type: 4,
                ip: "198.51.100.77".parse().unwrap(),
                port: 9944,
                modality: 1,
                coldkey: "5DAAnrj7VHTznn2AWBemMuyBwZWs6FNFjdyVXUeYum3PTXFy".to_string(),
            },
        ];

        Snapshot::from_parts(SnapshotParts {
            version: protocol_version(),
            tau: DEFAULT_TAU,
            block: 1_234_567,
            uids: vec![0, 1, 2],
            active: vec![true, true, false],
            stake: vec![1.0, 0.5, 0.123456789],
            ranks: vec![0.1, 0.2, 0.7],
            trust: vec![0.3, 0.3, 0.4],
            consensus: vec![0.9, 0.05, 0.05],
            incentive: vec![0.2, 0.2, 0.6],
            inflation: vec![0.000000001, 0.0, 1.5],
            dividends: vec![0, 17, u64::MAX],
            last_update: vec![1_234_500, 1_234_560, 0],
            weights: vec![
                vec![0.0, 0.3, 0.7],
                vec![0.1, 0.0, 0.0],
                vec![0.0, 0.0, 0.0],
            ],
            bonds: vec![
                vec![0.0, 0.0, 0.0],
                vec![0.25, 0.0, 0.75],
                vec![1.0 / 3.0, 0.0, 0.0],
            ],
            endpoints,
        })
        .unwrap()
    }

    #[test]
    fn bundle_round_trip() {
        let snapshot = sample_snapshot();
        let bytes = serialize(&snapshot).unwrap();
        let restored = deserialize(&bytes).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.hotkeys(), snapshot.hotkeys());
        assert_eq!(restored.addresses(), snapshot.addresses());
    }

    #[test]
    fn empty_snapshot_round_trip() {
        let snapshot = Snapshot::empty();
        let restored = deserialize(&serialize(&snapshot).unwrap()).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.n(), 0);
    }

    #[test]
    fn bundle_is_keyed_by_field_name() {
        let bytes = serialize(&sample_snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        for key in [
            "version", "n", "tau", "block", "uids", "active", "stake", "ranks", "trust",
            "consensus", "incentive", "inflation", "dividends", "last_update", "weights",
            "bonds", "endpoints",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["n"], 3);
        assert_eq!(
            value["endpoints"][0].as_array().unwrap().len(),
            meridian_core::PACKED_ENDPOINT_WORDS
        );
    }

    #[test]
    fn non_finite_floats_are_not_written() {
        let snapshot = sample_snapshot();
        let parts = |weight: f64, stake: f64| SnapshotParts {
            version: snapshot.version(),
            tau: snapshot.tau(),
            block: snapshot.block(),
            uids: vec![0],
            active: vec![true],
            stake: vec![stake],
            ranks: vec![0.0],
            trust: vec![0.0],
            consensus: vec![0.0],
            incentive: vec![0.0],
            inflation: vec![0.0],
            dividends: vec![0],
            last_update: vec![0],
            weights: vec![vec![weight]],
            bonds: vec![vec![0.0]],
            endpoints: vec![snapshot.endpoints()[0].clone()],
        };

        let infinite_weight = Snapshot::from_parts(parts(f64::INFINITY, 1.0)).unwrap();
        let err = serialize(&infinite_weight).unwrap_err();
        assert!(matches!(err, MeridianError::Serialization(msg) if msg.contains("weights")));

        let nan_stake = Snapshot::from_parts(parts(0.5, f64::NAN)).unwrap();
        let err = serialize(&nan_stake).unwrap_err();
        assert!(matches!(err, MeridianError::Serialization(msg) if msg.contains("stake")));

        let finite = Snapshot::from_parts(parts(0.5, 1.0)).unwrap();
        assert_eq!(deserialize(&serialize(&finite).unwrap()).unwrap(), finite);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = deserialize(b"not a bundle").unwrap_err();
        assert!(matches!(err, MeridianError::Deserialization(_)));
    }

    #[test]
    fn declared_n_must_match() {
        let bytes = serialize(&sample_snapshot()).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["n"] = serde_json::json!(4);
        let err = deserialize(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, MeridianError::Deserialization(_)));
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let bytes = serialize(&sample_snapshot()).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["weights"][1] = serde_json::json!([0.1, 0.0]);
        let err = deserialize(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, MeridianError::Deserialization(_)));
    }

    #[test]
    fn corrupt_endpoint_row_is_rejected() {
        let bytes = serialize(&sample_snapshot()).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        // Address family word.
        value["endpoints"][2][9] = serde_json::json!(7);
        let err = deserialize(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, MeridianError::Deserialization(msg) if msg.contains("endpoint row 2")));
    }

    #[test]
    fn unpackable_endpoint_fails_to_serialize() {
        let snapshot = sample_snapshot();
        let mut endpoints = snapshot.endpoints().to_vec();
        endpoints[0].hotkey = "k".repeat(meridian_core::KEY_BYTES + 1);
        let oversized = Snapshot::from_parts(SnapshotParts {
            version: snapshot.version(),
            tau: snapshot.tau(),
            block: snapshot.block(),
            uids: snapshot.uids().to_vec(),
            active: snapshot.active().to_vec(),
            stake: snapshot.stake().to_vec(),
            ranks: snapshot.ranks().to_vec(),
            trust: snapshot.trust().to_vec(),
            consensus: snapshot.consensus().to_vec(),
            incentive: snapshot.incentive().to_vec(),
            inflation: snapshot.inflation().to_vec(),
            dividends: snapshot.dividends().to_vec(),
            last_update: snapshot.last_update().to_vec(),
            weights: snapshot.weights().to_vec(),
            bonds: snapshot.bonds().to_vec(),
            endpoints,
        })
        .unwrap();
        assert!(matches!(
            serialize(&oversized),
            Err(MeridianError::Encoding(_))
        ));
    }
}
